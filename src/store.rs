//! In-process persistence for analyzed strings.
//!
//! The store is an explicitly constructed handle, not a process-wide
//! global — tests build their own isolated instances. One table keyed by
//! content id; check-and-insert happens under a single lock acquisition so
//! concurrent creates of the same value can never produce two records.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::StringFilter;
use crate::properties;

/// A stored string and its derived properties. Immutable once created.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalyzedString {
    /// Content identifier: lowercase-hex SHA-256 of `value`. Primary key.
    pub id: String,
    pub value: String,
    pub length: usize,
    pub is_palindrome: bool,
    pub unique_characters: usize,
    pub word_count: usize,
    pub character_frequency_map: HashMap<char, usize>,
    pub created_at: DateTime<Utc>,
}

impl AnalyzedString {
    /// Builds the full record for `value`, properties included.
    pub fn analyze(value: String) -> Self {
        let props = properties::compute(&value);
        Self {
            id: props.sha256_hash,
            value,
            length: props.length,
            is_palindrome: props.is_palindrome,
            unique_characters: props.unique_characters,
            word_count: props.word_count,
            character_frequency_map: props.character_frequency_map,
            created_at: props.created_at,
        }
    }
}

/// Outcome of a create-if-absent insert.
#[derive(Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

/// The single-table key-value store backing the service.
pub struct Store {
    records: Mutex<HashMap<String, AnalyzedString>>,
}

impl Store {
    pub fn new() -> Self {
        Self { records: Mutex::new(HashMap::new()) }
    }

    /// Inserts `record` unless its id is already present. The existence
    /// check and the insert share one lock acquisition — this is the
    /// store's only concurrency guarantee, and the one that matters.
    pub fn insert_if_absent(&self, record: AnalyzedString) -> InsertOutcome {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&record.id) {
            return InsertOutcome::AlreadyExists;
        }
        records.insert(record.id.clone(), record);
        InsertOutcome::Inserted
    }

    pub fn get(&self, id: &str) -> Option<AnalyzedString> {
        self.records.lock().unwrap().get(id).cloned()
    }

    /// Every record accepted by `filter`, in unspecified order, in full.
    pub fn select(&self, filter: &StringFilter) -> Vec<AnalyzedString> {
        self.records
            .lock()
            .unwrap()
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }

    /// Removes the record with `id`. Returns whether anything was removed.
    pub fn remove(&self, id: &str) -> bool {
        self.records.lock().unwrap().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
