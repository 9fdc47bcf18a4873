// HTTP surface: `GET /` readiness probe and `POST /leads` batch import.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{router, serve, AppState};
