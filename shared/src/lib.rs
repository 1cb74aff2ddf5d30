//! Shared library for the location lookup Lambda functions.
//!
//! This crate provides the postal code lookup handler together with its
//! configuration, country routing, MongoDB access and error types.

pub mod config;
pub mod country;
pub mod db;
pub mod error;
pub mod lookup;
pub mod models;
pub mod secrets;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, UriSource};
pub use country::{resolve_collection, Country};
pub use db::{ConnectionProvider, Connector, LocationStore, MongoConnector, MongoStore};
pub use error::{CallableError, Error, ErrorCode, Result};
pub use lookup::{get_location_details, handle_callable};
pub use models::{CallableResponse, LocationDetails, LocationRecord, LocationRequest};
pub use secrets::{get_mongodb_uri, get_secret};
