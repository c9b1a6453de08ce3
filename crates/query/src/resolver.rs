//! Free-text term resolution against the cached codelists.

use std::sync::Arc;

use codelist::{CodelistCache, CodelistSource, Domain};
use serde::Serialize;
use tracing::debug;

/// Activity status code for "Implementation".
pub const STATUS_IMPLEMENTATION: &str = "2";

/// Activity status code for "Finalisation".
pub const STATUS_COMPLETED: &str = "4";

/// Codes and filters extracted from a question. Absent means unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedTerms {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_status_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector_filter: Option<String>,
}

/// Resolves human-readable terms to Datastore codes.
pub struct TermResolver<S> {
    cache: Arc<CodelistCache<S>>,
}

impl<S> Clone for TermResolver<S> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<S: CodelistSource> TermResolver<S> {
    pub fn new(cache: Arc<CodelistCache<S>>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &CodelistCache<S> {
        &self.cache
    }

    /// Refresh stale codelists, then resolve every term in `question`.
    pub async fn interpret(&self, question: &str) -> ResolvedTerms {
        self.cache.ensure_all_fresh().await;
        self.resolve(question)
    }

    /// Resolve against whatever the cache currently holds.
    pub fn resolve(&self, question: &str) -> ResolvedTerms {
        let terms = ResolvedTerms {
            country_code: self.country(question),
            activity_status_code: self.status(question),
            sector_filter: self.sector(question),
        };
        debug!(?terms, "resolved question");
        terms
    }

    pub fn country(&self, query: &str) -> Option<String> {
        self.cache.lookup(Domain::Country, query)
    }

    /// Keyword shortcuts take precedence over the codelist.
    pub fn status(&self, query: &str) -> Option<String> {
        let query_lc = query.to_lowercase();
        if query_lc.contains("ongoing") || query_lc.contains("active") {
            return Some(STATUS_IMPLEMENTATION.to_string());
        }
        if query_lc.contains("completed") {
            return Some(STATUS_COMPLETED.to_string());
        }
        self.cache.lookup(Domain::ActivityStatus, query)
    }

    /// A `sector_code:<code>*` filter so that sub-sectors are included.
    pub fn sector(&self, query: &str) -> Option<String> {
        self.cache
            .lookup(Domain::Sector, query)
            .map(|code| format!("sector_code:{code}*"))
    }
}
