use crate::domain::model::{CompanyFields, ContactFields, ContactRecord, DivisionRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Remote CRM operations the reconciliation engine depends on.
#[async_trait]
pub trait CrmApi: Send + Sync {
    /// Exact, case-sensitive match on name (and postcode when given). `Ok(None)` when nothing matches.
    async fn find_company(&self, name: &str, postcode: Option<&str>)
        -> Result<Option<DivisionRecord>>;

    async fn create_company(&self, fields: &CompanyFields) -> Result<DivisionRecord>;

    async fn create_contact(&self, fields: &ContactFields) -> Result<ContactRecord>;
}
