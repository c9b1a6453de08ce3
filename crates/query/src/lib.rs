//! Query translation for the IATI Datastore.
//!
//! Two halves:
//!
//! - [`resolver`] maps free-text questions to codes and filter fragments
//!   using the cached codelists.
//! - [`compiler`] turns a typed [`QueryArgs`] bag into the Solr-style
//!   parameter set the Datastore `select` endpoints accept.
//!
//! Compilation is pure and total: every combination of optional fields
//! yields a valid query. Missing fields omit their clause; nothing is
//! rejected here. Validation belongs to whoever builds the [`QueryArgs`].

pub mod compiler;
pub mod resolver;

pub use compiler::{
    Collection, CompiledQuery, Facet, QueryArgs, compile, compile_activity_query,
    compile_budget_query, compile_transaction_query,
};
pub use resolver::{ResolvedTerms, TermResolver};
