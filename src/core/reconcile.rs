use crate::core::aggregator::BatchAggregator;
use crate::core::normalizer;
use crate::domain::model::{CrmId, DivisionAction, Lead, LeadError, LeadOutcome, LeadResult};
use crate::domain::policy::{CompanyResolution, ImportSettings};
use crate::domain::ports::CrmApi;
use crate::utils::error::{ErrorCategory, RelayError, Result};
use crate::utils::validation::non_blank;

/// Runs the find-or-create-company, then create-contact flow for each lead of a batch.
///
/// Leads are handled one after another. A failure is recorded against the lead
/// that caused it and the loop moves on; nothing a single lead does can abort
/// the batch.
pub struct LeadImporter<'a> {
    crm: &'a dyn CrmApi,
    settings: &'a ImportSettings,
}

impl<'a> LeadImporter<'a> {
    pub fn new(crm: &'a dyn CrmApi, settings: &'a ImportSettings) -> Self {
        Self { crm, settings }
    }

    pub async fn import_batch(&self, leads: Vec<serde_json::Value>) -> BatchAggregator {
        let total = leads.len();
        let mut aggregator = BatchAggregator::new();

        for (index, raw) in leads.into_iter().enumerate() {
            tracing::debug!("Processing lead {}/{}", index + 1, total);
            aggregator.push(self.import_value(raw).await);
        }

        aggregator
    }

    /// Decodes one raw batch entry, turning shape errors into a per-lead failure.
    pub async fn import_value(&self, raw: serde_json::Value) -> LeadOutcome {
        let fallback_name = raw
            .get("company_name")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        match serde_json::from_value::<Lead>(raw) {
            Ok(lead) => self.import_lead(&lead).await,
            Err(e) => {
                tracing::warn!("Rejected malformed lead {:?}: {}", fallback_name, e);
                LeadOutcome::Failed(LeadError {
                    company_name: fallback_name,
                    reason: Some(format!("invalid lead: {}", e)),
                    error: None,
                    details: None,
                })
            }
        }
    }

    pub async fn import_lead(&self, lead: &Lead) -> LeadOutcome {
        let company_name = normalizer::company_name(lead);

        match self.try_import(lead).await {
            Ok(result) => {
                tracing::info!(
                    "Imported lead {:?} (division: {:?}, contact: {:?})",
                    company_name,
                    result.division_id,
                    result.contact_id
                );
                LeadOutcome::Imported(result)
            }
            Err(e) => {
                tracing::warn!("Lead {:?} failed: {}", company_name, e);
                LeadOutcome::Failed(Self::failure(company_name, &e))
            }
        }
    }

    fn failure(company_name: Option<String>, err: &RelayError) -> LeadError {
        if err.category() == ErrorCategory::Validation {
            return LeadError {
                company_name,
                reason: Some(err.to_string()),
                error: None,
                details: None,
            };
        }
        LeadError {
            company_name,
            reason: None,
            error: Some(err.to_string()),
            details: err.details(),
        }
    }

    async fn try_import(&self, lead: &Lead) -> Result<LeadResult> {
        normalizer::check_required(lead, self.settings.mode)?;

        let (division_id, division_action) = self.resolve_company(lead).await?;

        let fields = normalizer::contact_fields(lead, self.settings, division_id.clone());
        let contact = self.crm.create_contact(&fields).await?;

        Ok(LeadResult {
            company_name: normalizer::company_name(lead),
            division_id,
            division_action,
            contact_id: contact.contact_id,
            email: non_blank(contact.email.as_deref())
                .map(str::to_string)
                .or(fields.email),
            role_code: non_blank(contact.role_code.as_deref())
                .map(str::to_string)
                .unwrap_or(fields.role_code),
        })
    }

    async fn resolve_company(
        &self,
        lead: &Lead,
    ) -> Result<(Option<CrmId>, Option<DivisionAction>)> {
        match self.settings.mode.company_resolution() {
            CompanyResolution::Unlinked => Ok((None, None)),
            CompanyResolution::FromLead => {
                let id = normalizer::division_id(lead)
                    .ok_or_else(|| RelayError::missing_field("division_id"))?;
                Ok((Some(id), Some(DivisionAction::Linked)))
            }
            CompanyResolution::Lookup { match_postcode } => {
                let fields = normalizer::company_fields(lead, self.settings)?;
                let postcode = if match_postcode {
                    fields.postcode.as_deref()
                } else {
                    None
                };

                // A failed lookup fails the lead rather than risk a duplicate company.
                if let Some(existing) = self.crm.find_company(&fields.name, postcode).await? {
                    tracing::debug!(
                        "Matched existing division {} for {}",
                        existing.division_id,
                        fields.name
                    );
                    return Ok((Some(existing.division_id), Some(DivisionAction::Matched)));
                }

                let created = self.crm.create_company(&fields).await?;
                tracing::debug!("Created division {} for {}", created.division_id, fields.name);
                Ok((Some(created.division_id), Some(DivisionAction::Created)))
            }
        }
    }
}
