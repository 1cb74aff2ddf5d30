//! AWS Secrets Manager integration.

use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;

use crate::{Error, Result};

/// Cached secrets with lazy initialization.
static SECRETS_CACHE: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn get_cache() -> &'static RwLock<HashMap<String, String>> {
    SECRETS_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// JSON shape of a connection secret, for secrets stored as key/value pairs.
#[derive(Debug, Deserialize)]
struct ConnectionSecret {
    #[serde(alias = "mongodb_uri")]
    uri: String,
}

/// Get a secret value from Secrets Manager with caching.
pub async fn get_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    // Check cache first
    {
        let cache = get_cache().read().await;
        if let Some(value) = cache.get(secret_arn) {
            return Ok(value.clone());
        }
    }

    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get secret: {}", e)))?;

    let secret_string = response
        .secret_string()
        .ok_or_else(|| Error::Aws("Secret has no string value".to_string()))?
        .to_string();

    {
        let mut cache = get_cache().write().await;
        cache.insert(secret_arn.to_string(), secret_string.clone());
    }

    Ok(secret_string)
}

/// Get the MongoDB connection URI from Secrets Manager.
pub async fn get_mongodb_uri(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    let secret_string = get_secret(client, secret_arn).await?;
    parse_mongodb_uri(&secret_string)
}

/// Accepts either the bare connection string or `{"uri": "..."}`.
fn parse_mongodb_uri(secret_string: &str) -> Result<String> {
    let trimmed = secret_string.trim();
    let uri = if trimmed.starts_with('{') {
        serde_json::from_str::<ConnectionSecret>(trimmed)
            .map_err(|e| Error::Config(format!("Failed to parse connection secret: {}", e)))?
            .uri
    } else {
        trimmed.to_string()
    };

    if uri.is_empty() {
        return Err(Error::Config("Connection secret is empty".to_string()));
    }
    Ok(uri)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_uri() {
        let uri = parse_mongodb_uri(" mongodb+srv://app:pw@cluster0.example.net/geo\n").unwrap();
        assert_eq!(uri, "mongodb+srv://app:pw@cluster0.example.net/geo");
    }

    #[test]
    fn test_parse_json_secret() {
        let uri = parse_mongodb_uri(r#"{"uri":"mongodb://db.example.com/geo"}"#).unwrap();
        assert_eq!(uri, "mongodb://db.example.com/geo");

        let uri = parse_mongodb_uri(r#"{"mongodb_uri":"mongodb://db.example.com/geo"}"#).unwrap();
        assert_eq!(uri, "mongodb://db.example.com/geo");
    }

    #[test]
    fn test_parse_empty_secret() {
        assert!(matches!(parse_mongodb_uri("   "), Err(Error::Config(_))));
        assert!(matches!(parse_mongodb_uri(r#"{"user":"x"}"#), Err(Error::Config(_))));
    }
}
