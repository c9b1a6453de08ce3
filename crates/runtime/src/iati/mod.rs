//! The IATI tool host.

mod args;
mod errors;
mod schema;

pub use args::{CodelistArgs, FinancialSearchArgs, InterpretArgs, ProjectSearchArgs, decode};
pub use errors::ToolError;
pub use schema::{
    GET_CODELIST, GET_PROJECTS, INTERPRET_QUERY, SEARCH_BUDGETS, SEARCH_TRANSACTIONS, tools,
};

use std::sync::Arc;

use codelist::{CodelistCache, CodelistSource};
use mcp::{CallToolResult, Tool, ToolHandler};
use query::{Collection, QueryArgs, TermResolver, compile};
use serde_json::Value;
use tracing::{info, warn};

use crate::http::Datastore;

/// Tool host wiring the codelist cache, resolver, compiler and Datastore.
pub struct IatiTools<S, D> {
    resolver: TermResolver<S>,
    datastore: D,
}

impl<S: CodelistSource, D: Datastore> IatiTools<S, D> {
    pub fn new(cache: Arc<CodelistCache<S>>, datastore: D) -> Self {
        Self {
            resolver: TermResolver::new(cache),
            datastore,
        }
    }

    pub fn resolver(&self) -> &TermResolver<S> {
        &self.resolver
    }

    /// Execute a tool call and return its JSON result.
    pub async fn execute(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        match name {
            GET_PROJECTS => {
                let args: ProjectSearchArgs = decode(arguments)?;
                self.search(Collection::Activity, args.into()).await
            }
            SEARCH_TRANSACTIONS => {
                let args: FinancialSearchArgs = decode(arguments)?;
                self.search(Collection::Transaction, args.into()).await
            }
            SEARCH_BUDGETS => {
                let args: FinancialSearchArgs = decode(arguments)?;
                self.search(Collection::Budget, args.into()).await
            }
            GET_CODELIST => {
                let args: CodelistArgs = decode(arguments)?;
                let name = args.validated_name()?;
                self.resolver
                    .cache()
                    .source()
                    .fetch(name)
                    .await
                    .map_err(|e| ToolError::Execution(e.to_string()))
            }
            INTERPRET_QUERY => {
                let args: InterpretArgs = decode(arguments)?;
                let terms = self.resolver.interpret(&args.question).await;
                serde_json::to_value(terms).map_err(|e| ToolError::Execution(e.to_string()))
            }
            other => Err(ToolError::NotFound(other.to_string())),
        }
    }

    async fn search(&self, collection: Collection, args: QueryArgs) -> Result<Value, ToolError> {
        let query = compile(&args, collection);
        info!(%collection, q = %query.q, "datastore search");
        Ok(self.datastore.select(collection, &query).await?)
    }
}

impl<S: CodelistSource, D: Datastore> ToolHandler for IatiTools<S, D> {
    fn tools(&self) -> Vec<Tool> {
        tools()
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> CallToolResult {
        match self.execute(name, arguments).await {
            Ok(value) => CallToolResult::json(&value),
            Err(e) => {
                warn!(tool = name, error = %e, "tool call failed");
                CallToolResult::error(e.to_string())
            }
        }
    }
}
