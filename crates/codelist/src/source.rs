//! Reference-data source abstraction.

use crate::Result;
use serde_json::Value;
use std::future::Future;

/// Trait for fetching published codelist documents.
///
/// Implementations return the raw JSON document for a codelist name
/// (e.g. `"Country"`). Transport concerns such as timeouts live here,
/// not in the cache.
pub trait CodelistSource: Send + Sync {
    /// Fetch the full document for `name`.
    fn fetch(&self, name: &str) -> impl Future<Output = Result<Value>> + Send;
}

/// A source serving canned documents from memory.
///
/// Useful for testing. Names that were never inserted fail like a missing
/// remote document.
#[derive(Debug, Default)]
pub struct MemorySource {
    docs: std::sync::RwLock<std::collections::HashMap<String, Value>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `items` as the `data` array of codelist `name`.
    pub fn with_items(self, name: &str, items: &[(&str, &str)]) -> Self {
        let data: Vec<Value> = items
            .iter()
            .map(|(code, name)| serde_json::json!({ "code": code, "name": name }))
            .collect();
        self.insert(name, serde_json::json!({ "data": data }));
        self
    }

    /// Serve `doc` verbatim for `name`.
    pub fn insert(&self, name: &str, doc: Value) {
        self.docs
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(name.to_string(), doc);
    }
}

impl CodelistSource for MemorySource {
    async fn fetch(&self, name: &str) -> Result<Value> {
        self.docs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| crate::Error::Source(format!("codelist '{name}' not found")))
    }
}
