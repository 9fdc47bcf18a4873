pub mod aggregator;
pub mod normalizer;
pub mod reconcile;

pub use crate::domain::model::{Lead, LeadOutcome};
pub use crate::domain::policy::{ImportMode, ImportSettings};
pub use crate::domain::ports::CrmApi;
pub use crate::utils::error::Result;
pub use aggregator::{BatchAggregator, BatchReport, BatchStatus};
pub use reconcile::LeadImporter;
