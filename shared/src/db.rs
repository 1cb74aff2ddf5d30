//! Database connection management.
//!
//! A [`ConnectionProvider`] is built once per process and handed to the
//! handler. It connects on first use and keeps the resulting store for later
//! invocations for as long as the store reports itself connected.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::error::ErrorKind;
use mongodb::options::{ClientOptions, ServerApi, ServerApiVersion};
use mongodb::{Client, Database};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::UriSource;
use crate::models::LocationRecord;
use crate::{Config, Error, Result};

/// Read access to the postal code collections.
#[async_trait]
pub trait LocationStore: Send + Sync + 'static {
    /// Liveness of the underlying connection.
    fn is_connected(&self) -> bool;

    /// Exact-match lookup on `postal_code`.
    async fn find_by_postal_code(
        &self,
        collection: &str,
        postal_code: &str,
    ) -> Result<Option<LocationRecord>>;
}

/// Opens new store connections.
#[async_trait]
pub trait Connector: Send + Sync {
    type Store: LocationStore;

    async fn connect(&self, uri: &str) -> Result<Self::Store>;
}

/// Lazily connected, reusable store handle.
pub struct ConnectionProvider<C: Connector> {
    connector: C,
    uri_source: UriSource,
    cached: RwLock<Option<Arc<C::Store>>>,
}

impl<C: Connector> ConnectionProvider<C> {
    pub fn new(connector: C, uri_source: UriSource) -> Self {
        Self {
            connector,
            uri_source,
            cached: RwLock::new(None),
        }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Return the cached store if it is still connected, otherwise connect.
    ///
    /// Concurrent callers that all miss the cache each connect on their own
    /// and the last one to finish is kept. A failed attempt leaves the cache
    /// untouched.
    pub async fn get_database_handle(&self) -> Result<Arc<C::Store>> {
        {
            let cached = self.cached.read().await;
            if let Some(store) = cached.as_ref() {
                if store.is_connected() {
                    return Ok(Arc::clone(store));
                }
                warn!("Cached database connection is no longer alive, reconnecting");
            }
        }

        let uri = self.uri_source.resolve().await?;

        info!("Attempting to connect to MongoDB...");
        let store = Arc::new(self.connector.connect(&uri).await?);
        info!("Successfully connected to MongoDB");

        let mut cached = self.cached.write().await;
        *cached = Some(Arc::clone(&store));
        Ok(store)
    }
}

/// Connects to MongoDB with the Stable API pinned to version 1.
#[derive(Debug, Clone)]
pub struct MongoConnector {
    app_name: String,
    database_name: Option<String>,
}

impl MongoConnector {
    pub fn new(config: &Config) -> Self {
        Self {
            app_name: config.app_name.clone(),
            database_name: config.database_name.clone(),
        }
    }
}

#[async_trait]
impl Connector for MongoConnector {
    type Store = MongoStore;

    async fn connect(&self, uri: &str) -> Result<MongoStore> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| Error::Connection(format!("Invalid connection string: {}", e)))?;

        options.app_name = Some(self.app_name.clone());
        options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );

        let database_name = options
            .default_database
            .clone()
            .or_else(|| self.database_name.clone())
            .ok_or_else(|| {
                Error::Config(
                    "No database name in the connection string or MONGODB_DATABASE".to_string(),
                )
            })?;

        let client = Client::with_options(options)
            .map_err(|e| Error::Connection(format!("Failed to create client: {}", e)))?;
        let database = client.database(&database_name);

        // The driver connects lazily; ping so a bad URI fails here.
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| Error::Connection(format!("Failed to ping MongoDB: {}", e)))?;

        Ok(MongoStore {
            database,
            connected: AtomicBool::new(true),
        })
    }
}

/// A connected MongoDB database.
#[derive(Debug)]
pub struct MongoStore {
    database: Database,
    connected: AtomicBool,
}

#[async_trait]
impl LocationStore for MongoStore {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn find_by_postal_code(
        &self,
        collection: &str,
        postal_code: &str,
    ) -> Result<Option<LocationRecord>> {
        let result = self
            .database
            .collection::<LocationRecord>(collection)
            .find_one(doc! { "postal_code": postal_code })
            .projection(doc! {
                "_id": 0,
                "postal_code": 1,
                "place_name": 1,
                "admin1_name": 1,
                "country_code": 1,
            })
            .await;

        match result {
            Ok(record) => Ok(record),
            Err(err) => {
                if is_connection_lost(&err) {
                    warn!(error = %err, "Lost connection to MongoDB");
                    self.connected.store(false, Ordering::Release);
                }
                Err(Error::Database(err))
            }
        }
    }
}

fn is_connection_lost(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Io(_) | ErrorKind::ServerSelection { .. } | ErrorKind::ConnectionPoolCleared { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeConnector;

    fn provider(connector: FakeConnector) -> ConnectionProvider<FakeConnector> {
        ConnectionProvider::new(connector, UriSource::Inline("mongodb://fake/geo".to_string()))
    }

    #[tokio::test]
    async fn test_live_handle_is_reused() {
        let provider = provider(FakeConnector::new());

        let first = provider.get_database_handle().await.unwrap();
        let second = provider.get_database_handle().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provider.connector().connect_count(), 1);
    }

    #[tokio::test]
    async fn test_disconnected_handle_is_replaced() {
        let provider = provider(FakeConnector::new());

        let first = provider.get_database_handle().await.unwrap();
        first.disconnect();
        let second = provider.get_database_handle().await.unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second.is_connected());
        assert_eq!(provider.connector().connect_count(), 2);

        provider.get_database_handle().await.unwrap();
        assert_eq!(provider.connector().connect_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_uri_never_connects() {
        let provider = ConnectionProvider::new(FakeConnector::new(), UriSource::Missing);

        let err = provider.get_database_handle().await.unwrap_err();

        assert!(matches!(err, Error::Config(_)));
        assert_eq!(provider.connector().connect_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_connect_is_not_cached() {
        let provider = provider(FakeConnector::failing());

        let err = provider.get_database_handle().await.unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
        assert!(provider.get_database_handle().await.is_err());

        assert_eq!(provider.connector().connect_count(), 2);
        assert!(provider.cached.read().await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_connection_string() {
        let connector = MongoConnector {
            app_name: "location-details".to_string(),
            database_name: None,
        };

        let err = connector.connect("not-a-mongodb-uri").await.unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
    }
}
