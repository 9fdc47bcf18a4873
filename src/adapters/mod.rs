// Adapters layer: concrete implementations for external systems.

pub mod crm;

pub use crm::{CrmClient, ODataFilter};
