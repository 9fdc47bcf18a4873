//! Maps inbound leads onto CRM field sets. Pure functions, no I/O.

use crate::domain::model::{CompanyFields, ContactFields, CrmId, Lead};
use crate::domain::policy::{ImportMode, ImportSettings, RequiredField};
use crate::utils::error::{RelayError, Result};
use crate::utils::validation::non_blank;

const STATUS_ACTIVE: &str = "Active";

fn owned(value: Option<&str>) -> Option<String> {
    non_blank(value).map(str::to_string)
}

pub fn company_name(lead: &Lead) -> Option<String> {
    owned(lead.company_name.as_deref())
}

/// Contact email, preferring the primary contact over the lead's main address.
pub fn contact_email(lead: &Lead) -> Option<String> {
    let primary = lead.primary_contact.as_ref().and_then(|c| c.email.as_deref());
    owned(primary).or_else(|| owned(lead.email_main.as_deref()))
}

/// Division id supplied on the lead, with surrounding whitespace removed from text ids.
pub fn division_id(lead: &Lead) -> Option<CrmId> {
    match lead.division_id.as_ref()? {
        CrmId::Number(n) => Some(CrmId::Number(*n)),
        CrmId::Text(s) => owned(Some(s)).map(CrmId::Text),
    }
}

pub fn role_code(lead: &Lead, settings: &ImportSettings) -> String {
    owned(lead.role_code.as_deref()).unwrap_or_else(|| settings.default_role_code.clone())
}

/// Rejects a lead lacking any field the mode requires. Checked before any CRM call.
pub fn check_required(lead: &Lead, mode: ImportMode) -> Result<()> {
    for field in mode.required_fields() {
        let present = match field {
            RequiredField::CompanyName => company_name(lead).is_some(),
            RequiredField::Postcode => non_blank(lead.postcode.as_deref()).is_some(),
            RequiredField::ContactEmail => contact_email(lead).is_some(),
            RequiredField::DivisionId => division_id(lead).is_some(),
        };
        if !present {
            return Err(RelayError::missing_field(field.as_str()));
        }
    }
    Ok(())
}

fn address(lead: &Lead) -> Option<String> {
    if let Some(single) = owned(lead.address.as_deref()) {
        return Some(single);
    }
    let parts: Vec<&str> = [
        &lead.address_line1,
        &lead.address_line2,
        &lead.town,
        &lead.county,
    ]
    .into_iter()
    .filter_map(|part| non_blank(part.as_deref()))
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

pub fn company_fields(lead: &Lead, settings: &ImportSettings) -> Result<CompanyFields> {
    let name = company_name(lead).ok_or_else(|| RelayError::missing_field("company_name"))?;

    Ok(CompanyFields {
        name,
        status_flag: STATUS_ACTIVE.to_string(),
        telephone: owned(lead.phone.as_deref()).or_else(|| owned(lead.phone_main.as_deref())),
        website: owned(lead.website.as_deref()),
        address: address(lead),
        postcode: owned(lead.postcode.as_deref()),
        country: owned(lead.country.as_deref()),
        operating_company_code: settings.operating_company_code.clone(),
        company_group_code: settings.company_group_code.clone(),
    })
}

pub fn contact_fields(
    lead: &Lead,
    settings: &ImportSettings,
    division_id: Option<CrmId>,
) -> ContactFields {
    let contact = lead.primary_contact.clone().unwrap_or_default();
    let forename = owned(contact.first_name.as_deref());
    let surname = owned(contact.last_name.as_deref());

    let contact_name = owned(contact.full_name.as_deref()).or_else(|| {
        let joined = [forename.as_deref(), surname.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            None
        } else {
            Some(joined)
        }
    });

    ContactFields {
        forename,
        surname,
        contact_name,
        email: contact_email(lead),
        telephone: owned(contact.phone_direct.as_deref())
            .or_else(|| owned(lead.phone_main.as_deref())),
        mobile: owned(contact.phone_mobile.as_deref()),
        position: owned(contact.job_title.as_deref()),
        status_flag: STATUS_ACTIVE.to_string(),
        role_code: role_code(lead, settings),
        division_id,
    }
}
