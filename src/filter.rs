//! Query filters and the natural-language filter parser.
//!
//! The parser is a deliberately small rule engine: an ordered list of
//! (pattern, effect) pairs evaluated top to bottom over the lowercased
//! query. Rules are independent and **later rules may overwrite earlier
//! assignments to the same key** — last writer wins. That includes the
//! asymmetry between the "first vowel" default (rule 5) and the
//! "containing the letter X" re-check (rule 6): rule 6 always wins the
//! tie. The asymmetry is kept as-is rather than silently fixed.
//!
//! The parser does no semantic validation. A query matching nothing yields
//! an empty filter, which selects every stored string. Conflicting bounds
//! (`min_length > max_length`) are the caller's problem, checked via
//! [`StringFilter::validate`] — the parser itself never sets `max_length`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::store::AnalyzedString;

/// A structured filter set, from explicit query parameters or the
/// natural-language parser. All present keys are applied conjunctively.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StringFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_palindrome: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains_character: Option<char>,
}

/// The natural-language query could not be parsed at all.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty query")]
    EmptyQuery,
}

/// Parsed min/max bounds contradict each other.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("min_length ({min}) cannot be greater than max_length ({max})")]
pub struct ConflictingFilters {
    pub min: usize,
    pub max: usize,
}

static SINGLE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"single word|one word|\bonly one\b").unwrap());
static LONGER_THAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"longer than (\d+)").unwrap());
static PALINDROMIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"palindromic|palindrome").unwrap());
static CONTAINS_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"contain(?:ing|s)? the letter ([a-z])").unwrap());
static CONTAINING_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"containing the letter ([a-z])").unwrap());

impl StringFilter {
    /// Maps a free-text query to a filter set. Fails only on an empty or
    /// whitespace-only query; a query matching no rule yields the empty
    /// filter.
    pub fn parse_query(query: &str) -> Result<Self, ParseError> {
        if query.trim().is_empty() {
            return Err(ParseError::EmptyQuery);
        }

        let lowered = query.to_lowercase();
        let mut filter = Self::default();

        // Rule 1: "single word" / "one word" / standalone "only one".
        if SINGLE_WORD.is_match(&lowered) {
            filter.word_count = Some(1);
        }

        // Rule 2: "longer than N" means strictly longer, so N + 1.
        if let Some(caps) = LONGER_THAN.captures(&lowered) {
            if let Ok(n) = caps[1].parse::<usize>() {
                filter.min_length = Some(n + 1);
            }
        }

        // Rule 3: any palindrome phrasing, plural included.
        if PALINDROMIC.is_match(&lowered) {
            filter.is_palindrome = Some(true);
        }

        // Rule 4: "contains/containing the letter x".
        if let Some(caps) = CONTAINS_LETTER.captures(&lowered) {
            filter.contains_character = caps[1].chars().next();
        }

        // Rule 5: "first vowel" defaults the character to 'a' unless one
        // was already captured. Literal behavior, no vowel detection.
        if lowered.contains("first vowel") && filter.contains_character.is_none() {
            filter.contains_character = Some('a');
        }

        // Rule 6: the "containing" phrasing specifically always wins,
        // overwriting rule 5's default. Redundant with rule 4 for this
        // exact phrasing, and kept that way.
        if let Some(caps) = CONTAINING_LETTER.captures(&lowered) {
            filter.contains_character = caps[1].chars().next();
        }

        Ok(filter)
    }

    /// Rejects a filter whose bounds can never match anything.
    pub fn validate(&self) -> Result<(), ConflictingFilters> {
        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                return Err(ConflictingFilters { min, max });
            }
        }
        Ok(())
    }

    /// True when every present key accepts `record`. An empty filter
    /// accepts everything.
    pub fn matches(&self, record: &AnalyzedString) -> bool {
        if let Some(wc) = self.word_count {
            if record.word_count != wc {
                return false;
            }
        }
        if let Some(min) = self.min_length {
            if record.length < min {
                return false;
            }
        }
        if let Some(max) = self.max_length {
            if record.length > max {
                return false;
            }
        }
        if let Some(pal) = self.is_palindrome {
            if record.is_palindrome != pal {
                return false;
            }
        }
        if let Some(ch) = self.contains_character {
            // Case-sensitive substring test against the original value.
            if !record.value.contains(ch) {
                return false;
            }
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
