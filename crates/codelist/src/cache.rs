//! Time-bounded cache of the reference codelists.

use std::sync::{PoisonError, RwLock, RwLockReadGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::item::CodelistDocument;
use crate::{CodelistSource, CodelistTable, Domain, Error, FallbackTable};

/// Maximum age before a table is refreshed on next use.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60 * 24);

/// A refresh replaced the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Updated {
    pub items: usize,
}

/// A refresh failed and the previous contents were kept.
#[derive(Debug)]
pub struct StaleRetained {
    pub error: Error,
    pub retained: usize,
}

/// Outcome of a single refresh attempt.
pub type RefreshOutcome = std::result::Result<Updated, StaleRetained>;

/// In-memory cache of the Country, Sector and ActivityStatus codelists.
///
/// Refresh is lazy and best-effort: a failed fetch leaves the existing
/// table in place and is only reported through the returned outcome and
/// the log. Concurrent refreshes of the same domain are not coalesced;
/// the last successful write wins.
pub struct CodelistCache<S> {
    source: S,
    ttl: Duration,
    tables: [RwLock<CodelistTable>; 3],
}

impl<S: CodelistSource> CodelistCache<S> {
    /// Create an empty cache with the default 24h TTL.
    pub fn new(source: S) -> Self {
        Self {
            source,
            ttl: DEFAULT_TTL,
            tables: Default::default(),
        }
    }

    /// Override the TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// The underlying source, for uncached passthrough reads.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Whether `domain` is due for a refresh at `now`.
    pub fn is_stale_at(&self, domain: Domain, now: DateTime<Utc>) -> bool {
        let fetched_at = self.read(domain).fetched_at;
        match (now - fetched_at).to_std() {
            Ok(age) => age >= self.ttl,
            // Clock moved backwards; treat as fresh.
            Err(_) => false,
        }
    }

    /// Refresh `domain` if its TTL has elapsed.
    ///
    /// Returns `None` when the table was still fresh and nothing was fetched.
    pub async fn ensure_fresh(&self, domain: Domain) -> Option<RefreshOutcome> {
        self.ensure_fresh_at(domain, Utc::now()).await
    }

    pub async fn ensure_fresh_at(
        &self,
        domain: Domain,
        now: DateTime<Utc>,
    ) -> Option<RefreshOutcome> {
        if !self.is_stale_at(domain, now) {
            debug!(%domain, "codelist still fresh");
            return None;
        }
        Some(self.refresh_at(domain, now).await)
    }

    /// Bring all three domains up to date concurrently.
    pub async fn ensure_all_fresh(&self) {
        tokio::join!(
            self.ensure_fresh(Domain::Country),
            self.ensure_fresh(Domain::Sector),
            self.ensure_fresh(Domain::ActivityStatus),
        );
    }

    /// Fetch `domain` unconditionally.
    pub async fn refresh(&self, domain: Domain) -> RefreshOutcome {
        self.refresh_at(domain, Utc::now()).await
    }

    async fn refresh_at(&self, domain: Domain, now: DateTime<Utc>) -> RefreshOutcome {
        let fetched = self
            .source
            .fetch(domain.codelist_name())
            .await
            .and_then(decode);

        match fetched {
            Ok(doc) => {
                let items = doc.data.len();
                self.write(domain, |table| table.replace(doc.data, now));
                info!(%domain, items, "codelist refreshed");
                Ok(Updated { items })
            }
            Err(error) => {
                let retained = self.read(domain).items.len();
                warn!(%domain, retained, %error, "codelist refresh failed, keeping cached data");
                Err(StaleRetained { error, retained })
            }
        }
    }

    /// Resolve free text to a code for `domain`.
    ///
    /// The first table item whose name occurs in `query` wins (case-insensitive,
    /// stored order, no ranking). Otherwise the whole lowercased query is looked
    /// up exactly in the domain's fallback table.
    pub fn lookup(&self, domain: Domain, query: &str) -> Option<String> {
        let query_lc = query.to_lowercase();
        if let Some(code) = self.read(domain).find_contained(&query_lc) {
            return Some(code.to_string());
        }
        FallbackTable::for_domain(domain)
            .get(&query_lc)
            .map(str::to_string)
    }

    /// A copy of the current table for `domain`.
    pub fn snapshot(&self, domain: Domain) -> CodelistTable {
        self.read(domain).clone()
    }

    fn read(&self, domain: Domain) -> RwLockReadGuard<'_, CodelistTable> {
        domain
            .slot(&self.tables)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, domain: Domain, f: impl FnOnce(&mut CodelistTable)) {
        let mut table = domain
            .slot(&self.tables)
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut table);
    }
}

fn decode(doc: Value) -> crate::Result<CodelistDocument> {
    Ok(serde_json::from_value(doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CodelistItem;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-process source serving canned documents.
    #[derive(Default)]
    struct FakeSource {
        docs: Mutex<Vec<(String, Value)>>,
        fail: Mutex<bool>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn with(name: &str, items: &[(&str, &str)]) -> Self {
            let source = Self::default();
            source.set(name, items);
            source
        }

        fn set(&self, name: &str, items: &[(&str, &str)]) {
            let data: Vec<Value> = items
                .iter()
                .map(|(code, name)| json!({ "code": code, "name": name }))
                .collect();
            let mut docs = self.docs.lock().unwrap();
            docs.retain(|(n, _)| n != name);
            docs.push((name.to_string(), json!({ "data": data })));
        }

        fn set_raw(&self, name: &str, doc: Value) {
            self.docs.lock().unwrap().push((name.to_string(), doc));
        }

        fn fail(&self, fail: bool) {
            *self.fail.lock().unwrap() = fail;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl CodelistSource for FakeSource {
        async fn fetch(&self, name: &str) -> crate::Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if *self.fail.lock().unwrap() {
                return Err(Error::Source("connection refused".into()));
            }
            self.docs
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|(n, _)| n == name)
                .map(|(_, doc)| doc.clone())
                .ok_or_else(|| Error::Source(format!("404 for {name}")))
        }
    }

    #[tokio::test]
    async fn ensure_fresh_fetches_once_within_ttl() {
        let cache = CodelistCache::new(FakeSource::with("Country", &[("KE", "Kenya")]));

        let first = cache.ensure_fresh(Domain::Country).await;
        assert!(matches!(first, Some(Ok(Updated { items: 1 }))));
        assert!(cache.ensure_fresh(Domain::Country).await.is_none());
        assert_eq!(cache.source().calls(), 1);
    }

    #[tokio::test]
    async fn ensure_fresh_refetches_after_ttl() {
        let cache = CodelistCache::new(FakeSource::with("Country", &[("KE", "Kenya")]));
        let start = Utc::now();

        cache.ensure_fresh_at(Domain::Country, start).await;
        let almost = start + chrono::Duration::hours(23);
        let outcome = cache.ensure_fresh_at(Domain::Country, almost).await;
        assert!(outcome.is_none());
        let expired = start + chrono::Duration::hours(24);
        let outcome = cache.ensure_fresh_at(Domain::Country, expired).await;
        assert!(outcome.is_some());
        assert_eq!(cache.source().calls(), 2);
        assert_eq!(cache.snapshot(Domain::Country).fetched_at, expired);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_existing_items() {
        let cache = CodelistCache::new(FakeSource::with("Country", &[("KE", "Kenya")]))
            .with_ttl(Duration::ZERO);
        cache.ensure_fresh(Domain::Country).await;
        let before = cache.snapshot(Domain::Country).fetched_at;

        cache.source().fail(true);
        let outcome = cache.ensure_fresh(Domain::Country).await;
        match outcome {
            Some(Err(StaleRetained { retained, .. })) => assert_eq!(retained, 1),
            other => panic!("expected stale retained, got {other:?}"),
        }
        let table = cache.snapshot(Domain::Country);
        assert_eq!(table.items, vec![CodelistItem::new("KE", "Kenya")]);
        assert_eq!(table.fetched_at, before);
    }

    #[tokio::test]
    async fn malformed_document_is_stale_retained() {
        let source = FakeSource::default();
        source.set_raw("Sector", json!({ "rows": [] }));
        let cache = CodelistCache::new(source);

        let Some(Err(stale)) = cache.ensure_fresh(Domain::Sector).await else {
            panic!("expected stale retained");
        };
        assert!(matches!(stale.error, Error::Decode(_)));
        assert_eq!(stale.retained, 0);
        assert_eq!(
            cache.snapshot(Domain::Sector).fetched_at,
            DateTime::<Utc>::UNIX_EPOCH
        );
    }

    #[tokio::test]
    async fn refresh_replaces_rather_than_merges() {
        let cache = CodelistCache::new(FakeSource::with("Country", &[("KE", "Kenya")]));
        cache.refresh(Domain::Country).await.unwrap();
        cache.source().set("Country", &[("UG", "Uganda")]);
        cache.refresh(Domain::Country).await.unwrap();

        assert_eq!(
            cache.snapshot(Domain::Country).items,
            vec![CodelistItem::new("UG", "Uganda")]
        );
    }

    #[tokio::test]
    async fn ensure_all_fresh_touches_every_domain() {
        let source = FakeSource::with("Country", &[("KE", "Kenya")]);
        source.set("Sector", &[("111", "Education, Level Unspecified")]);
        // ActivityStatus is missing and fails independently.
        let cache = CodelistCache::new(source);

        cache.ensure_all_fresh().await;
        assert_eq!(cache.source().calls(), 3);
        assert_eq!(cache.snapshot(Domain::Country).items.len(), 1);
        assert_eq!(cache.snapshot(Domain::Sector).items.len(), 1);
        assert!(cache.snapshot(Domain::ActivityStatus).items.is_empty());
    }

    #[tokio::test]
    async fn lookup_matches_name_inside_query() {
        let cache = CodelistCache::new(FakeSource::with(
            "Country",
            &[("KE", "Kenya"), ("UG", "Uganda")],
        ));
        cache.refresh(Domain::Country).await.unwrap();

        assert_eq!(
            cache.lookup(Domain::Country, "Health projects in UGANDA"),
            Some("UG".to_string())
        );
        assert_eq!(cache.lookup(Domain::Country, "projects in Peru"), None);
    }

    #[tokio::test]
    async fn table_match_wins_over_fallback() {
        let cache = CodelistCache::new(FakeSource::with("Country", &[("XK", "Kenya")]));
        cache.refresh(Domain::Country).await.unwrap();
        assert_eq!(
            cache.lookup(Domain::Country, "kenya"),
            Some("XK".to_string())
        );
    }

    #[test]
    fn empty_table_uses_exact_fallback() {
        let cache = CodelistCache::new(FakeSource::default());

        let lookup = |domain, query| cache.lookup(domain, query);
        assert_eq!(lookup(Domain::Country, "Kenya"), Some("KE".to_string()));
        assert_eq!(lookup(Domain::Country, "UGANDA"), Some("UG".to_string()));
        assert_eq!(lookup(Domain::Country, "projects in kenya"), None);
        assert_eq!(lookup(Domain::Sector, "education"), Some("111".to_string()));
        assert_eq!(cache.lookup(Domain::ActivityStatus, "nothing"), None);
    }

    #[test]
    fn new_cache_is_stale() {
        let cache = CodelistCache::new(FakeSource::default());
        for domain in Domain::ALL {
            assert!(cache.is_stale_at(domain, Utc::now()));
        }
    }
}
