//! HTTP collaborators for the IATI reference downloads and Datastore.

mod codelists;
mod datastore;

pub use codelists::{DEFAULT_CODELIST_URL, HttpCodelistSource};
pub use datastore::{DEFAULT_DATASTORE_URL, Datastore, DatastoreClient};

use crate::{Error, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the shared HTTP client.
pub fn client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("iati-mcp/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))
}

/// GET `url` and decode the body as JSON.
async fn get_json(client: &reqwest::Client, url: reqwest::Url) -> Result<Value> {
    debug!(%url, "GET");
    let response = client
        .get(url)
        .header("accept", "application/json")
        .send()
        .await
        .map_err(|e| Error::Network(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Api(format!("{status}: {body}")));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| Error::InvalidResponse(e.to_string()))
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}
