use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the CRM. Some tenants return integers, others strings;
/// the original JSON type is kept so it can be forwarded unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CrmId {
    Number(i64),
    Text(String),
}

impl fmt::Display for CrmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrmId::Number(n) => write!(f, "{}", n),
            CrmId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrimaryContact {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_direct: Option<String>,
    pub phone_mobile: Option<String>,
    pub job_title: Option<String>,
}

/// One entry of an inbound batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Lead {
    pub company_name: Option<String>,
    pub postcode: Option<String>,
    pub address: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub town: Option<String>,
    pub county: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub primary_contact: Option<PrimaryContact>,
    pub email_main: Option<String>,
    pub phone_main: Option<String>,
    pub division_id: Option<CrmId>,
    pub role_code: Option<String>,
}

/// Body of a `POST /Divisions` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompanyFields {
    pub name: String,
    pub status_flag: String,
    pub telephone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_company_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_group_code: Option<String>,
}

/// Body of a `POST /Contacts` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContactFields {
    pub forename: Option<String>,
    pub surname: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub mobile: Option<String>,
    pub position: Option<String>,
    pub status_flag: String,
    pub role_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division_id: Option<CrmId>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DivisionRecord {
    #[serde(rename = "DivisionId")]
    pub division_id: CrmId,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Postcode", default)]
    pub postcode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContactRecord {
    #[serde(rename = "ContactId", default)]
    pub contact_id: Option<CrmId>,
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
    #[serde(rename = "RoleCode", default)]
    pub role_code: Option<String>,
}

/// How a lead's company was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DivisionAction {
    Matched,
    Created,
    Linked,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadResult {
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division_id: Option<CrmId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division_action: Option<DivisionAction>,
    pub contact_id: Option<CrmId>,
    pub email: Option<String>,
    pub role_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadError {
    pub company_name: Option<String>,
    /// Local rejection, no CRM call made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Remote failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LeadOutcome {
    Imported(LeadResult),
    Failed(LeadError),
}
