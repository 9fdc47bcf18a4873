#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::adapters::CrmClient;
use crate::domain::policy::{ImportMode, ImportSettings};
use crate::utils::error::{RelayError, Result};
use crate::utils::validation::{self, non_blank, Validate};
use std::collections::HashMap;
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// Connection details for the CRM. Both values must be present before leads can be imported.
#[derive(Debug, Clone, Default)]
pub struct CrmSettings {
    pub base_url: Option<String>,
    pub access_token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl CrmSettings {
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some() && self.access_token.is_some()
    }

    /// Builds the client, or `None` while credentials are missing.
    pub fn client(&self) -> Result<Option<CrmClient>> {
        let (Some(base_url), Some(token)) = (&self.base_url, &self.access_token) else {
            return Ok(None);
        };
        let client = match self.timeout_seconds {
            Some(secs) => CrmClient::with_timeout(base_url, token, Duration::from_secs(secs))?,
            None => CrmClient::new(base_url, token),
        };
        Ok(Some(client))
    }
}

/// Fully resolved relay configuration.
///
/// Sources, lowest precedence first: built-in defaults, the TOML file,
/// environment variables, command-line flags. Missing secrets are allowed here;
/// the server reports them on `GET /` and refuses imports until they are set.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub import_api_key: Option<String>,
    pub crm: CrmSettings,
    pub import: ImportSettings,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            import_api_key: None,
            crm: CrmSettings::default(),
            import: ImportSettings::default(),
        }
    }
}

fn parse_mode(value: &str) -> Result<ImportMode> {
    value
        .parse()
        .map_err(|reason| RelayError::InvalidConfigValueError {
            field: "import.mode".to_string(),
            value: value.to_string(),
            reason,
        })
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| RelayError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

impl RelayConfig {
    pub fn from_sources(file: Option<TomlConfig>, env: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(file) = file {
            config.apply_file(file)?;
        }
        config.apply_env(env)?;
        Ok(config)
    }

    fn apply_file(&mut self, file: TomlConfig) -> Result<()> {
        if let Some(server) = file.server {
            if let Some(host) = non_blank(server.host.as_deref()) {
                self.host = host.to_string();
            }
            if let Some(port) = server.port {
                self.port = port;
            }
            if let Some(key) = non_blank(server.api_key.as_deref()) {
                self.import_api_key = Some(key.to_string());
            }
        }
        if let Some(crm) = file.crm {
            self.crm.base_url = non_blank(crm.base_url.as_deref()).map(str::to_string);
            self.crm.access_token = non_blank(crm.access_token.as_deref()).map(str::to_string);
            self.crm.timeout_seconds = crm.timeout_seconds;
            self.import.operating_company_code =
                non_blank(crm.operating_company_code.as_deref()).map(str::to_string);
            self.import.company_group_code =
                non_blank(crm.company_group_code.as_deref()).map(str::to_string);
        }
        if let Some(import) = file.import {
            if let Some(mode) = non_blank(import.mode.as_deref()) {
                self.import.mode = parse_mode(mode)?;
            }
            if let Some(role) = non_blank(import.default_role_code.as_deref()) {
                self.import.default_role_code = role.to_string();
            }
        }
        Ok(())
    }

    fn apply_env(&mut self, env: &HashMap<String, String>) -> Result<()> {
        let get = |key: &str| non_blank(env.get(key).map(String::as_str)).map(str::to_string);

        if let Some(host) = get("HOST") {
            self.host = host;
        }
        if let Some(port) = get("PORT") {
            self.port = parse_number("PORT", &port)?;
        }
        if let Some(key) = get("IMPORT_API_KEY") {
            self.import_api_key = Some(key);
        }
        if let Some(url) = get("CRM_BASE_URL") {
            self.crm.base_url = Some(url);
        }
        if let Some(token) = get("CRM_ACCESS_TOKEN") {
            self.crm.access_token = Some(token);
        }
        if let Some(timeout) = get("CRM_TIMEOUT_SECONDS") {
            self.crm.timeout_seconds = Some(parse_number("CRM_TIMEOUT_SECONDS", &timeout)?);
        }
        if let Some(code) = get("CRM_OPERATING_COMPANY_CODE") {
            self.import.operating_company_code = Some(code);
        }
        if let Some(code) = get("CRM_COMPANY_GROUP_CODE") {
            self.import.company_group_code = Some(code);
        }
        if let Some(role) = get("DEFAULT_ROLE_CODE") {
            self.import.default_role_code = role;
        }
        if let Some(mode) = get("IMPORT_MODE") {
            self.import.mode = parse_mode(&mode)?;
        }
        Ok(())
    }
}

impl Validate for RelayConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("host", &self.host)?;
        if let Err(e) = self.host.parse::<std::net::IpAddr>() {
            return Err(RelayError::InvalidConfigValueError {
                field: "host".to_string(),
                value: self.host.clone(),
                reason: format!("must be an IP address: {}", e),
            });
        }
        validation::validate_range("port", self.port, 1, u16::MAX)?;

        if let Some(url) = &self.crm.base_url {
            validation::validate_url("crm.base_url", url)?;
        }
        if let Some(timeout) = self.crm.timeout_seconds {
            validation::validate_range("crm.timeout_seconds", timeout, 1, 600)?;
        }
        validation::validate_non_empty_string(
            "import.default_role_code",
            &self.import.default_role_code,
        )?;

        if self.import_api_key.is_none() {
            tracing::warn!("IMPORT_API_KEY is not set; POST /leads will answer 500");
        }
        if !self.crm.is_configured() {
            tracing::warn!("CRM_BASE_URL / CRM_ACCESS_TOKEN not set; POST /leads will answer 500");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = RelayConfig::from_sources(None, &HashMap::new()).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert!(config.import_api_key.is_none());
        assert!(!config.crm.is_configured());
        assert_eq!(config.import.mode, ImportMode::CompanyAndContact);
        assert_eq!(config.import.default_role_code, "LEAD");
        assert!(config.crm.client().unwrap().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides_file() {
        let file = TomlConfig::from_toml_str(
            r#"
[server]
port = 8081
api_key = "file-key"

[crm]
base_url = "https://file.example.com"
access_token = "file-token"

[import]
mode = "company_by_name"
"#,
        )
        .unwrap();
        let vars = env(&[
            ("IMPORT_API_KEY", "env-key"),
            ("CRM_BASE_URL", "https://env.example.com/odata"),
            ("IMPORT_MODE", "linked-contact"),
            ("DEFAULT_ROLE_CODE", "DM"),
            ("CRM_OPERATING_COMPANY_CODE", ""),
        ]);

        let config = RelayConfig::from_sources(Some(file), &vars).unwrap();
        assert_eq!(config.port, 8081);
        assert_eq!(config.import_api_key.as_deref(), Some("env-key"));
        assert_eq!(
            config.crm.base_url.as_deref(),
            Some("https://env.example.com/odata")
        );
        assert_eq!(config.crm.access_token.as_deref(), Some("file-token"));
        assert_eq!(config.import.mode, ImportMode::LinkedContact);
        assert_eq!(config.import.default_role_code, "DM");
        assert!(config.import.operating_company_code.is_none());
        assert!(config.crm.client().unwrap().is_some());
    }

    #[test]
    fn test_invalid_env_values() {
        let bad_port = RelayConfig::from_sources(None, &env(&[("PORT", "eighty")]));
        assert!(matches!(
            bad_port,
            Err(RelayError::InvalidConfigValueError { .. })
        ));

        let bad_mode = RelayConfig::from_sources(None, &env(&[("IMPORT_MODE", "merge")]));
        assert!(bad_mode.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_crm_url() {
        let config =
            RelayConfig::from_sources(None, &env(&[("CRM_BASE_URL", "crm.example.com")])).unwrap();
        assert!(config.validate().is_err());
    }
}
