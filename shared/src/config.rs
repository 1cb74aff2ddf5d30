//! Configuration management for Lambda functions.

use std::env;

use aws_sdk_secretsmanager::Client as SecretsClient;

use crate::secrets::get_mongodb_uri;
use crate::{Error, Result};

const DEFAULT_APP_NAME: &str = "location-details";

/// Application configuration loaded from environment variables.
///
/// Nothing here is required at startup. A missing connection URI only
/// surfaces as an error when the first lookup needs a connection.
#[derive(Debug, Clone)]
pub struct Config {
    /// MongoDB connection string
    pub mongodb_uri: Option<String>,
    /// ARN of a secret holding the connection string
    pub mongodb_uri_secret_arn: Option<String>,
    /// Database name, when the URI does not carry one
    pub database_name: Option<String>,
    /// App name reported to the server
    pub app_name: String,
    /// AWS region
    pub aws_region: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup. Empty values count
    /// as unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            mongodb_uri: var("MONGODB_URI"),
            mongodb_uri_secret_arn: var("MONGODB_URI_SECRET_ARN"),
            database_name: var("MONGODB_DATABASE"),
            app_name: var("MONGODB_APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            aws_region: var("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
        }
    }

    /// Whether the URI has to be fetched from Secrets Manager.
    pub fn needs_secrets(&self) -> bool {
        self.mongodb_uri.is_none() && self.mongodb_uri_secret_arn.is_some()
    }

    /// Build the URI source for the connection provider. An inline URI wins
    /// over a secret.
    pub fn uri_source(&self, secrets_client: Option<SecretsClient>) -> UriSource {
        if let Some(uri) = &self.mongodb_uri {
            return UriSource::Inline(uri.clone());
        }
        match (&self.mongodb_uri_secret_arn, secrets_client) {
            (Some(arn), Some(client)) => UriSource::Secret {
                client,
                arn: arn.clone(),
            },
            _ => UriSource::Missing,
        }
    }
}

/// Where the connection URI comes from.
#[derive(Debug, Clone)]
pub enum UriSource {
    Inline(String),
    Secret { client: SecretsClient, arn: String },
    Missing,
}

impl UriSource {
    /// Resolve the connection URI.
    pub async fn resolve(&self) -> Result<String> {
        match self {
            UriSource::Inline(uri) => Ok(uri.clone()),
            UriSource::Secret { client, arn } => get_mongodb_uri(client, arn).await,
            UriSource::Missing => Err(Error::Config(
                "MongoDB URI is missing: set MONGODB_URI or MONGODB_URI_SECRET_ARN".to_string(),
            )),
        }
    }
}
