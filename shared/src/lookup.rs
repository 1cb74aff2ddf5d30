//! Postal code lookup handler.

use serde_json::Value;
use tracing::{debug, info};

use crate::country::Country;
use crate::db::{ConnectionProvider, Connector, LocationStore};
use crate::models::{CallableResponse, LocationDetails, LocationRequest};
use crate::{CallableError, Error, Result};

/// Handle a raw invocation payload and build the response envelope.
pub async fn handle_callable<C: Connector>(
    provider: &ConnectionProvider<C>,
    payload: Value,
) -> CallableResponse<LocationDetails> {
    let result = match LocationRequest::from_payload(payload) {
        Ok(request) => get_location_details(provider, request).await,
        Err(err) => Err(CallableError::from(err)),
    };
    result.into()
}

/// Look up the place name and region for a postal code.
pub async fn get_location_details<C: Connector>(
    provider: &ConnectionProvider<C>,
    request: LocationRequest,
) -> std::result::Result<LocationDetails, CallableError> {
    lookup(provider, request).await.map_err(CallableError::from)
}

async fn lookup<C: Connector>(
    provider: &ConnectionProvider<C>,
    request: LocationRequest,
) -> Result<LocationDetails> {
    let (zip_code, country_code) = match (
        non_empty(request.zip_code),
        non_empty(request.country_code),
    ) {
        (Some(zip_code), Some(country_code)) => (zip_code, country_code),
        _ => {
            return Err(Error::InvalidArgument(
                "Missing zipCode or countryCode.".to_string(),
            ))
        }
    };

    let country: Country = country_code.parse()?;
    let store = provider.get_database_handle().await?;

    debug!(collection = country.collection(), zip_code = %zip_code, "Looking up postal code");

    // Exact match: zip codes are not normalized.
    let record = store
        .find_by_postal_code(country.collection(), &zip_code)
        .await?
        .ok_or_else(|| {
            Error::NotFound(format!(
                "No data found for zip code {} in {}.",
                zip_code, country_code
            ))
        })?;

    info!(country = %country, zip_code = %zip_code, "Found location details");
    Ok(record.into())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
