//! The string service: orchestrates property computation and the store.

use std::sync::Arc;

use tracing::debug;

use crate::error::ApiError;
use crate::filter::StringFilter;
use crate::properties;
use crate::store::{AnalyzedString, InsertOutcome, Store};

/// Create/read/list/delete over analyzed strings. Cheap to clone; all
/// clones share the same store.
#[derive(Clone)]
pub struct StringService {
    store: Arc<Store>,
}

impl StringService {
    /// Wraps an explicitly constructed store. Tests hand in their own
    /// isolated instance; there is no implicit global.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Analyzes and persists `value`. Fails with [`ApiError::AlreadyExists`]
    /// when a record with the same content id is present — the store makes
    /// the check-and-insert atomic, so concurrent creates of one value
    /// produce exactly one record.
    pub fn create(&self, value: String) -> Result<AnalyzedString, ApiError> {
        let record = AnalyzedString::analyze(value);
        debug!(id = %record.id, length = record.length, "create");
        match self.store.insert_if_absent(record.clone()) {
            InsertOutcome::Inserted => Ok(record),
            InsertOutcome::AlreadyExists => Err(ApiError::AlreadyExists),
        }
    }

    /// Looks up by value, recomputing the content id. `None` is an ordinary
    /// absence signal; the HTTP layer turns it into 404.
    pub fn get_by_value(&self, value: &str) -> Option<AnalyzedString> {
        self.store.get(&properties::content_id(value))
    }

    /// All records accepted by `filter`, conjunctively. Empty filter means
    /// everything. The full result set is returned — no pagination.
    pub fn list(&self, filter: &StringFilter) -> Vec<AnalyzedString> {
        self.store.select(filter)
    }

    /// Removes the record for `value` if present. Absence is a normal
    /// `false`, never an error — the HTTP layer decides 204 vs 404.
    pub fn delete(&self, value: &str) -> bool {
        self.store.remove(&properties::content_id(value))
    }
}
