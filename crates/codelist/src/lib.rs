//! Cached reference codelists for the IATI Datastore.
//!
//! The IATI Standard publishes its enumerations (countries, sectors,
//! activity statuses, ...) as versioned codelists. This crate keeps an
//! in-memory copy of the three lists needed to turn natural-language
//! terms into Datastore filter codes.
//!
//! # Overview
//!
//! - [`CodelistCache`] owns one [`CodelistTable`] per [`Domain`] and
//!   refreshes a table lazily once its TTL (24h by default) has elapsed.
//! - A failed refresh never surfaces as an error to lookups; the previous
//!   contents are retained and reported as [`StaleRetained`].
//! - [`CodelistCache::lookup`] matches table names contained in the query
//!   text, then falls back to a small static [`FallbackTable`].
//! - [`CodelistSource`] abstracts the transport so the cache can be driven
//!   by an HTTP client in production and by in-process fakes in tests.
//!
//! # Example
//!
//! ```ignore
//! use codelist::{CodelistCache, Domain};
//!
//! let cache = CodelistCache::new(source);
//! cache.ensure_fresh(Domain::Country).await;
//! assert_eq!(cache.lookup(Domain::Country, "projects in Kenya").as_deref(), Some("KE"));
//! ```

mod cache;
mod error;
mod item;
mod source;

pub use cache::{CodelistCache, DEFAULT_TTL, RefreshOutcome, StaleRetained, Updated};
pub use error::{Error, Result};
pub use item::{CodelistItem, CodelistTable, Domain, FallbackTable};
pub use source::{CodelistSource, MemorySource};
