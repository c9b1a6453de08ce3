//! Codelist entries, tables and the static fallback mappings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reference domain backed by one published codelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Country,
    Sector,
    ActivityStatus,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Country, Domain::Sector, Domain::ActivityStatus];

    /// The codelist name as published by the reference source.
    pub fn codelist_name(self) -> &'static str {
        match self {
            Domain::Country => "Country",
            Domain::Sector => "Sector",
            Domain::ActivityStatus => "ActivityStatus",
        }
    }

    fn index(self) -> usize {
        match self {
            Domain::Country => 0,
            Domain::Sector => 1,
            Domain::ActivityStatus => 2,
        }
    }

    pub(crate) fn slot<T>(self, slots: &[T; 3]) -> &T {
        &slots[self.index()]
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.codelist_name())
    }
}

/// A single `{code, name}` reference entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodelistItem {
    pub code: String,
    pub name: String,
}

impl CodelistItem {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// The shape of a published codelist document. Extra fields are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct CodelistDocument {
    pub data: Vec<CodelistItem>,
}

/// Cached contents of one domain's codelist.
#[derive(Debug, Clone)]
pub struct CodelistTable {
    pub items: Vec<CodelistItem>,
    pub fetched_at: DateTime<Utc>,
}

impl Default for CodelistTable {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            fetched_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

impl CodelistTable {
    /// Code of the first item whose name appears inside `query_lc`.
    ///
    /// `query_lc` must already be lowercased.
    pub fn find_contained(&self, query_lc: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|item| !item.name.is_empty() && query_lc.contains(&item.name.to_lowercase()))
            .map(|item| item.code.as_str())
    }

    /// Replace the contents wholesale. `fetched_at` never moves backwards.
    pub(crate) fn replace(&mut self, items: Vec<CodelistItem>, now: DateTime<Utc>) {
        self.items = items;
        self.fetched_at = self.fetched_at.max(now);
    }
}

/// Static term → code mapping consulted when the live table has no match.
#[derive(Debug, Clone, Copy)]
pub struct FallbackTable {
    entries: &'static [(&'static str, &'static str)],
}

impl FallbackTable {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// The built-in fallback for a domain.
    pub fn for_domain(domain: Domain) -> Self {
        match domain {
            Domain::Country => Self::new(&[("uganda", "UG"), ("kenya", "KE")]),
            Domain::Sector => Self::new(&[("education", "111")]),
            Domain::ActivityStatus => Self::new(&[("ongoing", "2"), ("completed", "4")]),
        }
    }

    /// Exact lookup on an already lowercased term.
    pub fn get(&self, term_lc: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(term, _)| *term == term_lc)
            .map(|(_, code)| *code)
    }
}
