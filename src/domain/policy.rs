use serde::{Deserialize, Serialize};
use std::fmt;

/// Reconciliation policy applied to every lead of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Look up the company by name and postcode, create it if absent, then add the contact.
    #[default]
    CompanyAndContact,
    /// Look up the company by name only.
    CompanyByName,
    /// Create a standalone contact keyed on its email.
    ContactOnly,
    /// Attach the contact to the `division_id` supplied on the lead.
    LinkedContact,
}

/// Field a mode refuses to proceed without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    CompanyName,
    Postcode,
    ContactEmail,
    DivisionId,
}

impl RequiredField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredField::CompanyName => "company_name",
            RequiredField::Postcode => "postcode",
            RequiredField::ContactEmail => "contact email",
            RequiredField::DivisionId => "division_id",
        }
    }
}

/// Where the contact's DivisionId comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyResolution {
    /// Find-or-create through the CRM, optionally matching on postcode too.
    Lookup { match_postcode: bool },
    /// Taken verbatim from the lead.
    FromLead,
    /// Contact is created without a company link.
    Unlinked,
}

impl ImportMode {
    pub fn required_fields(&self) -> &'static [RequiredField] {
        match self {
            ImportMode::CompanyAndContact => &[RequiredField::CompanyName, RequiredField::Postcode],
            ImportMode::CompanyByName => &[RequiredField::CompanyName],
            ImportMode::ContactOnly => &[RequiredField::ContactEmail],
            ImportMode::LinkedContact => &[RequiredField::DivisionId],
        }
    }

    pub fn company_resolution(&self) -> CompanyResolution {
        match self {
            ImportMode::CompanyAndContact => CompanyResolution::Lookup {
                match_postcode: true,
            },
            ImportMode::CompanyByName => CompanyResolution::Lookup {
                match_postcode: false,
            },
            ImportMode::ContactOnly => CompanyResolution::Unlinked,
            ImportMode::LinkedContact => CompanyResolution::FromLead,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::CompanyAndContact => "company_and_contact",
            ImportMode::CompanyByName => "company_by_name",
            ImportMode::ContactOnly => "contact_only",
            ImportMode::LinkedContact => "linked_contact",
        }
    }
}

pub const DEFAULT_ROLE_CODE: &str = "LEAD";

/// Per-process import behaviour shared by every batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSettings {
    pub mode: ImportMode,
    pub default_role_code: String,
    pub operating_company_code: Option<String>,
    pub company_group_code: Option<String>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            mode: ImportMode::default(),
            default_role_code: DEFAULT_ROLE_CODE.to_string(),
            operating_company_code: None,
            company_group_code: None,
        }
    }
}

impl ImportSettings {
    pub fn with_mode(mode: ImportMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "company_and_contact" => Ok(ImportMode::CompanyAndContact),
            "company_by_name" => Ok(ImportMode::CompanyByName),
            "contact_only" => Ok(ImportMode::ContactOnly),
            "linked_contact" => Ok(ImportMode::LinkedContact),
            other => Err(format!(
                "unknown import mode '{}'; expected one of company_and_contact, company_by_name, contact_only, linked_contact",
                other
            )),
        }
    }
}
