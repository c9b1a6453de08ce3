//! IATI runtime — HTTP collaborators and the MCP tool host.
//!
//! This crate connects the pure parts of the system to the outside world:
//!
//! - **HttpCodelistSource**: downloads published codelists; plugs into the
//!   [`codelist::CodelistCache`] as its [`codelist::CodelistSource`].
//! - **DatastoreClient**: executes compiled queries against the IATI
//!   Datastore `select` endpoints and returns the response verbatim.
//! - **IatiTools**: the [`mcp::ToolHandler`] exposing `get_iati_projects`,
//!   `search_transactions`, `search_budgets`, `get_codelist` and
//!   `interpret_query`.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use codelist::CodelistCache;
//! use runtime::{DatastoreClient, HttpCodelistSource, IatiTools, http};
//!
//! # async fn example() -> runtime::Result<()> {
//! let client = http::client(http::DEFAULT_TIMEOUT)?;
//! let source = HttpCodelistSource::new(client.clone(), http::DEFAULT_CODELIST_URL);
//! let datastore = DatastoreClient::new(client, http::DEFAULT_DATASTORE_URL);
//! let tools = IatiTools::new(Arc::new(CodelistCache::new(source)), datastore);
//!
//! let terms = tools.resolver().interpret("education projects in Kenya").await;
//! println!("{terms:?}");
//! # Ok(())
//! # }
//! ```

mod error;
pub mod http;
pub mod iati;

pub use error::{Error, Result};
pub use http::{Datastore, DatastoreClient, HttpCodelistSource};
pub use iati::{IatiTools, ToolError};
