use crate::domain::model::{CompanyFields, ContactFields, ContactRecord, DivisionRecord};
use crate::domain::ports::CrmApi;
use crate::utils::error::{RelayError, Result};
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;

const DIVISIONS: &str = "Divisions";
const CONTACTS: &str = "Contacts";

/// Conjunction of exact-match clauses rendered as an OData `$filter` expression.
///
/// Values become OData string literals with embedded single quotes doubled, so
/// user input can never close the literal. The rendered expression is handed to
/// reqwest as a query parameter and percent-encoded there.
#[derive(Debug, Clone, Default)]
pub struct ODataFilter {
    clauses: Vec<String>,
}

impl ODataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: &str) -> Self {
        self.clauses
            .push(format!("{} eq {}", field, Self::string_literal(value)));
        self
    }

    pub fn eq_opt(self, field: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.eq(field, v),
            None => self,
        }
    }

    pub fn string_literal(value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    pub fn build(&self) -> String {
        self.clauses.join(" and ")
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Collection<T> {
    OData { value: Vec<T> },
    Bare(Vec<T>),
}

impl<T> Collection<T> {
    fn into_first(self) -> Option<T> {
        match self {
            Collection::OData { value } => value.into_iter().next(),
            Collection::Bare(items) => items.into_iter().next(),
        }
    }
}

/// HTTP client for the CRM's OData record endpoints. Immutable once built.
#[derive(Debug, Clone)]
pub struct CrmClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl CrmClient {
    pub fn new(base_url: &str, access_token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    pub fn with_timeout(base_url: &str, access_token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            ..Self::new(base_url, access_token)
        })
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.access_token)
            .header(ACCEPT, "application/json")
    }

    async fn post_json<B: serde::Serialize + ?Sized>(
        &self,
        resource: &str,
        body: &B,
    ) -> Result<String> {
        let url = self.endpoint(resource);
        tracing::debug!("POST {}", url);

        let response = self
            .authorized(self.client.post(&url))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("CRM response status: {}", status);
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("CRM error body: {}", body);
            return Err(RelayError::RemoteWriteError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.text().await?)
    }

    async fn read_error(response: Response) -> RelayError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!("CRM lookup error body: {}", body);
        RelayError::RemoteReadError { status, body }
    }
}

#[async_trait::async_trait]
impl CrmApi for CrmClient {
    async fn find_company(
        &self,
        name: &str,
        postcode: Option<&str>,
    ) -> Result<Option<DivisionRecord>> {
        let filter = ODataFilter::new()
            .eq("Name", name)
            .eq_opt("Postcode", postcode)
            .build();
        let url = self.endpoint(DIVISIONS);
        tracing::debug!("GET {} $filter={}", url, filter);

        let response = self
            .authorized(self.client.get(&url))
            .query(&[("$top", "1"), ("$filter", filter.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let collection: Collection<DivisionRecord> = response.json().await?;
        Ok(collection.into_first())
    }

    async fn create_company(&self, fields: &CompanyFields) -> Result<DivisionRecord> {
        let body = self.post_json(DIVISIONS, fields).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn create_contact(&self, fields: &ContactFields) -> Result<ContactRecord> {
        let body = self.post_json(CONTACTS, fields).await?;
        // A bare 2xx without a representation still means the contact exists.
        if body.trim().is_empty() {
            return Ok(ContactRecord {
                contact_id: None,
                email: None,
                role_code: None,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CrmId;
    use httpmock::prelude::*;

    fn company(name: &str) -> CompanyFields {
        CompanyFields {
            name: name.to_string(),
            status_flag: "Active".to_string(),
            telephone: None,
            website: None,
            address: None,
            postcode: Some("E1 6AN".to_string()),
            country: None,
            operating_company_code: None,
            company_group_code: None,
        }
    }

    fn contact(division_id: Option<CrmId>) -> ContactFields {
        ContactFields {
            forename: Some("Ada".to_string()),
            surname: Some("Lovelace".to_string()),
            contact_name: Some("Ada Lovelace".to_string()),
            email: Some("ada@acme.com".to_string()),
            telephone: None,
            mobile: None,
            position: None,
            status_flag: "Active".to_string(),
            role_code: "LEAD".to_string(),
            division_id,
        }
    }

    #[test]
    fn test_filter_escapes_quotes() {
        let filter = ODataFilter::new()
            .eq("Name", "O'Brien & Sons")
            .eq_opt("Postcode", Some("E1 6AN"))
            .build();
        assert_eq!(filter, "Name eq 'O''Brien & Sons' and Postcode eq 'E1 6AN'");
    }

    #[test]
    fn test_filter_cannot_break_out_of_literal() {
        let filter = ODataFilter::new()
            .eq("Name", "x' or Name ne 'y")
            .eq_opt("Postcode", None)
            .build();
        assert_eq!(filter, "Name eq 'x'' or Name ne ''y'");
    }

    #[tokio::test]
    async fn test_find_company_returns_first_match() {
        let server = MockServer::start_async().await;
        let lookup = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/Divisions")
                    .header("Authorization", "Bearer crm-token")
                    .query_param("$top", "1")
                    .query_param("$filter", "Name eq 'O''Brien' and Postcode eq 'E1 6AN'");
                then.status(200).json_body(serde_json::json!({
                    "value": [{"DivisionId": 17, "Name": "O'Brien", "Postcode": "E1 6AN"}]
                }));
            })
            .await;

        let client = CrmClient::new(&server.base_url(), "crm-token");
        let found = client
            .find_company("O'Brien", Some("E1 6AN"))
            .await
            .unwrap()
            .unwrap();

        lookup.assert_async().await;
        assert_eq!(found.division_id, CrmId::Number(17));
        assert_eq!(found.name.as_deref(), Some("O'Brien"));
    }

    #[tokio::test]
    async fn test_find_company_empty_result_is_not_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/Divisions");
                then.status(200).json_body(serde_json::json!({"value": []}));
            })
            .await;

        let client = CrmClient::new(&server.base_url(), "crm-token");
        assert!(client.find_company("Acme", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_company_accepts_bare_array() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/Divisions");
                then.status(200)
                    .json_body(serde_json::json!([{"DivisionId": "DIV-1"}]));
            })
            .await;

        let client = CrmClient::new(&format!("{}/", server.base_url()), "crm-token");
        let found = client.find_company("Acme", None).await.unwrap().unwrap();
        assert_eq!(found.division_id, CrmId::Text("DIV-1".to_string()));
    }

    #[tokio::test]
    async fn test_find_company_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/Divisions");
                then.status(503).body("maintenance");
            })
            .await;

        let client = CrmClient::new(&server.base_url(), "crm-token");
        match client.find_company("Acme", None).await {
            Err(RelayError::RemoteReadError { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("expected RemoteReadError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_company_posts_pascal_case_fields() {
        let server = MockServer::start_async().await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/Divisions")
                    .header("Authorization", "Bearer crm-token")
                    .header("Content-Type", "application/json")
                    .json_body_partial(r#"{"Name": "Acme", "StatusFlag": "Active", "Postcode": "E1 6AN"}"#);
                then.status(201)
                    .json_body(serde_json::json!({"DivisionId": 99, "Name": "Acme"}));
            })
            .await;

        let client = CrmClient::new(&server.base_url(), "crm-token");
        let created = client.create_company(&company("Acme")).await.unwrap();

        create.assert_async().await;
        assert_eq!(created.division_id, CrmId::Number(99));
    }

    #[tokio::test]
    async fn test_create_company_failure_carries_upstream_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/Divisions");
                then.status(400)
                    .json_body(serde_json::json!({"error": {"message": "Name too long"}}));
            })
            .await;

        let client = CrmClient::new(&server.base_url(), "crm-token");
        let err = client.create_company(&company("Acme")).await.unwrap_err();
        match &err {
            RelayError::RemoteWriteError { status, .. } => assert_eq!(*status, 400),
            other => panic!("expected RemoteWriteError, got {:?}", other),
        }
        assert_eq!(
            err.details().unwrap(),
            serde_json::json!({"error": {"message": "Name too long"}})
        );
    }

    #[tokio::test]
    async fn test_create_contact_links_division() {
        let server = MockServer::start_async().await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/Contacts")
                    .json_body_partial(r#"{"DivisionId": 99, "Email": "ada@acme.com", "RoleCode": "LEAD"}"#);
                then.status(201).json_body(serde_json::json!({
                    "ContactId": 501,
                    "Email": "ada@acme.com",
                    "RoleCode": "LEAD"
                }));
            })
            .await;

        let client = CrmClient::new(&server.base_url(), "crm-token");
        let created = client
            .create_contact(&contact(Some(CrmId::Number(99))))
            .await
            .unwrap();

        create.assert_async().await;
        assert_eq!(created.contact_id, Some(CrmId::Number(501)));
    }

    #[tokio::test]
    async fn test_create_contact_empty_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/Contacts");
                then.status(204);
            })
            .await;

        let client = CrmClient::new(&server.base_url(), "crm-token");
        let created = client.create_contact(&contact(None)).await.unwrap();
        assert!(created.contact_id.is_none());
    }
}
