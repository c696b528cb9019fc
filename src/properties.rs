//! Derived textual properties of a string.
//!
//! [`compute`] is a total function: every string, including the empty one,
//! produces a valid [`Properties`] record. The only non-deterministic field
//! is `created_at`, which reads the clock.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Everything the service derives from a string, computed once at creation.
#[derive(Clone, Debug)]
pub struct Properties {
    /// Character count (Unicode scalar values, not bytes).
    pub length: usize,
    /// True iff the lowercased value equals its own character-wise reverse.
    /// Whitespace and punctuation are not stripped first.
    pub is_palindrome: bool,
    /// Count of distinct characters, case-sensitive.
    pub unique_characters: usize,
    /// Count of maximal non-whitespace runs.
    pub word_count: usize,
    /// Lowercase-hex SHA-256 of the UTF-8 bytes. Doubles as the record id.
    pub sha256_hash: String,
    /// Per-character occurrence counts, case-sensitive, whitespace included.
    pub character_frequency_map: HashMap<char, usize>,
    pub created_at: DateTime<Utc>,
}

/// Computes the content identifier alone: lowercase-hex SHA-256 of the
/// string's UTF-8 bytes. Same value, same id, always.
pub fn content_id(value: &str) -> String {
    use std::fmt::Write;

    let digest = Sha256::digest(value.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Derives all properties of `value`. Deterministic except `created_at`.
pub fn compute(value: &str) -> Properties {
    let lowered = value.to_lowercase();
    let is_palindrome = lowered.chars().eq(lowered.chars().rev());

    let mut character_frequency_map = HashMap::new();
    for ch in value.chars() {
        *character_frequency_map.entry(ch).or_insert(0) += 1;
    }

    Properties {
        length: value.chars().count(),
        is_palindrome,
        unique_characters: value.chars().collect::<HashSet<_>>().len(),
        word_count: value.split_whitespace().count(),
        sha256_hash: content_id(value),
        character_frequency_map,
        created_at: Utc::now(),
    }
}
