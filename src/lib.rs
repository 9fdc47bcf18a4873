pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::CrmClient;
pub use api::{router, serve, AppState};
pub use config::RelayConfig;
pub use crate::core::{BatchReport, ImportMode, ImportSettings, LeadImporter};
pub use utils::error::{RelayError, Result};
