//! Shared data models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::CallableError;

/// Lookup request payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationRequest {
    #[serde(rename = "zipCode", default)]
    pub zip_code: Option<String>,
    #[serde(rename = "countryCode", default)]
    pub country_code: Option<String>,
}

impl LocationRequest {
    pub fn new(zip_code: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            zip_code: Some(zip_code.into()),
            country_code: Some(country_code.into()),
        }
    }

    /// Parse an invocation payload, with or without the `{"data": ...}`
    /// envelope used by callable clients.
    pub fn from_payload(payload: Value) -> crate::Result<Self> {
        let payload = match payload {
            Value::Object(mut fields) if fields.contains_key("data") => {
                fields.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        };

        if payload.is_null() {
            return Ok(Self::default());
        }

        serde_json::from_value(payload)
            .map_err(|e| crate::Error::InvalidArgument(format!("Invalid request payload: {}", e)))
    }
}

/// Lookup result returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationDetails {
    pub place_name: String,
    pub admin1_name: String,
    pub country_code: String,
}

/// Postal code document as stored in a country collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub postal_code: String,
    pub place_name: String,
    pub admin1_name: String,
    pub country_code: String,
}

impl From<LocationRecord> for LocationDetails {
    fn from(record: LocationRecord) -> Self {
        Self {
            place_name: record.place_name,
            admin1_name: record.admin1_name,
            country_code: record.country_code,
        }
    }
}

/// Response envelope: `{"result": ...}` or `{"error": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallableResponse<T> {
    Result(T),
    Error(CallableError),
}

impl<T> From<std::result::Result<T, CallableError>> for CallableResponse<T> {
    fn from(result: std::result::Result<T, CallableError>) -> Self {
        match result {
            Ok(value) => CallableResponse::Result(value),
            Err(err) => CallableResponse::Error(err),
        }
    }
}
