use std::env;
use std::fs::File;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::services::auth_policy::AuthPolicy;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE: &str = "smart_db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{0} has an invalid value: {1}")]
    Invalid(&'static str, String),
    #[error("failed to load service account bundle: {0}")]
    ServiceAccount(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub mongodb_url: String,
    pub database: String,
    pub service_account_path: String,
    pub auth_policy: AuthPolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(AppConfig {
            port: parse_port(env::var("PORT").ok().as_deref())?,
            mongodb_url: env::var("MONGODB_URL").map_err(|_| ConfigError::Missing("MONGODB_URL"))?,
            database: env::var("MONGODB_DB").unwrap_or_else(|_| DEFAULT_DATABASE.to_string()),
            service_account_path: env::var("FIREBASE_SERVICE_ACCOUNT")
                .map_err(|_| ConfigError::Missing("FIREBASE_SERVICE_ACCOUNT"))?,
            auth_policy: parse_auth_policy(env::var("AUTH_POLICY").ok().as_deref())?,
        })
    }
}

fn parse_port(value: Option<&str>) -> Result<u16, ConfigError> {
    match value {
        None | Some("") => Ok(DEFAULT_PORT),
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid("PORT", raw.to_string())),
    }
}

fn parse_auth_policy(value: Option<&str>) -> Result<AuthPolicy, ConfigError> {
    match value {
        None | Some("") => Ok(AuthPolicy::Open),
        Some(raw) if raw.eq_ignore_ascii_case("open") => Ok(AuthPolicy::Open),
        Some(raw) if raw.eq_ignore_ascii_case("strict") => Ok(AuthPolicy::Strict),
        Some(raw) => Err(ConfigError::Invalid("AUTH_POLICY", raw.to_string())),
    }
}

/// Firebase service account bundle, the admin SDK JSON file. Only the fields
/// the verifier needs are read; the rest of the file is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub project_id: String,
    pub client_email: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
}

impl ServiceAccount {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file =
            File::open(path.as_ref()).map_err(|e| ConfigError::ServiceAccount(e.to_string()))?;
        serde_json::from_reader(file).map_err(|e| ConfigError::ServiceAccount(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    // Ortam değişkenleri testler arasında yarışır, o yüzden parse
    // fonksiyonları üzerinden test ediyoruz.
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn port_defaults_to_3000() {
        assert_eq!(parse_port(None).unwrap(), DEFAULT_PORT);
        assert_eq!(parse_port(Some("")).unwrap(), DEFAULT_PORT);
    }

    #[test]
    fn port_parses_explicit_value() {
        assert_eq!(parse_port(Some("8080")).unwrap(), 8080);
    }

    #[test]
    fn port_rejects_garbage() {
        assert!(matches!(
            parse_port(Some("not-a-port")),
            Err(ConfigError::Invalid("PORT", _))
        ));
    }

    #[test]
    fn auth_policy_defaults_to_open() {
        assert_eq!(parse_auth_policy(None).unwrap(), AuthPolicy::Open);
        assert_eq!(parse_auth_policy(Some("")).unwrap(), AuthPolicy::Open);
    }

    #[test]
    fn auth_policy_parses_case_insensitively() {
        assert_eq!(parse_auth_policy(Some("strict")).unwrap(), AuthPolicy::Strict);
        assert_eq!(parse_auth_policy(Some("STRICT")).unwrap(), AuthPolicy::Strict);
        assert_eq!(parse_auth_policy(Some("Open")).unwrap(), AuthPolicy::Open);
    }

    #[test]
    fn auth_policy_rejects_unknown_values() {
        assert!(matches!(
            parse_auth_policy(Some("lenient")),
            Err(ConfigError::Invalid("AUTH_POLICY", _))
        ));
    }

    #[test]
    fn service_account_reads_project_id() {
        let bundle: ServiceAccount = serde_json::from_str(
            r#"{
                "type": "service_account",
                "project_id": "smart-deals",
                "private_key_id": "abc123",
                "client_email": "firebase-adminsdk@smart-deals.iam.gserviceaccount.com"
            }"#,
        )
        .unwrap();
        assert_eq!(bundle.project_id, "smart-deals");
        assert_eq!(bundle.private_key_id.as_deref(), Some("abc123"));
    }
}
