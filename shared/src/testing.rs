//! In-memory store for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::db::{Connector, LocationStore};
use crate::models::LocationRecord;
use crate::{Error, Result};

type Records = HashMap<(String, String), LocationRecord>;

#[derive(Debug)]
pub(crate) struct FakeStore {
    connected: AtomicBool,
    records: Records,
    queries: Arc<AtomicUsize>,
}

impl FakeStore {
    pub(crate) fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl LocationStore for FakeStore {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn find_by_postal_code(
        &self,
        collection: &str,
        postal_code: &str,
    ) -> Result<Option<LocationRecord>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .get(&(collection.to_string(), postal_code.to_string()))
            .cloned())
    }
}

/// Hands out [`FakeStore`]s and counts connect attempts and queries.
#[derive(Default)]
pub(crate) struct FakeConnector {
    records: Records,
    fail: bool,
    connects: AtomicUsize,
    queries: Arc<AtomicUsize>,
}

impl FakeConnector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn with_record(mut self, collection: &str, record: LocationRecord) -> Self {
        self.records
            .insert((collection.to_string(), record.postal_code.clone()), record);
        self
    }

    pub(crate) fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub(crate) fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Store = FakeStore;

    async fn connect(&self, _uri: &str) -> Result<FakeStore> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Connection("connection refused".to_string()));
        }
        Ok(FakeStore {
            connected: AtomicBool::new(true),
            records: self.records.clone(),
            queries: Arc::clone(&self.queries),
        })
    }
}

pub(crate) fn record(
    postal_code: &str,
    place_name: &str,
    admin1_name: &str,
    country_code: &str,
) -> LocationRecord {
    LocationRecord {
        postal_code: postal_code.to_string(),
        place_name: place_name.to_string(),
        admin1_name: admin1_name.to_string(),
        country_code: country_code.to_string(),
    }
}
