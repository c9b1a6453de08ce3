//! IATI Datastore search client.

use std::future::Future;

use super::{get_json, join_url};
use crate::{Error, Result};
use query::{Collection, CompiledQuery};
use serde_json::Value;

pub const DEFAULT_DATASTORE_URL: &str = "https://api.iatistandard.org/datastore";

/// Trait for executing compiled queries.
///
/// The result document is returned verbatim.
pub trait Datastore: Send + Sync {
    fn select(
        &self,
        collection: Collection,
        query: &CompiledQuery,
    ) -> impl Future<Output = Result<Value>> + Send;
}

/// Datastore client issuing `GET <base>/<collection>/select?...`.
#[derive(Debug, Clone)]
pub struct DatastoreClient {
    client: reqwest::Client,
    base_url: String,
}

impl DatastoreClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// The full request URL for a query.
    pub fn select_url(
        &self,
        collection: Collection,
        query: &CompiledQuery,
    ) -> Result<reqwest::Url> {
        let url = join_url(&self.base_url, &format!("{collection}/select"));
        reqwest::Url::parse_with_params(&url, query.params())
            .map_err(|e| Error::Config(format!("invalid datastore url {url}: {e}")))
    }
}

impl Datastore for DatastoreClient {
    async fn select(&self, collection: Collection, query: &CompiledQuery) -> Result<Value> {
        let url = self.select_url(collection, query)?;
        get_json(&self.client, url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query::{QueryArgs, compile};

    #[test]
    fn select_url_encodes_params() {
        let client = DatastoreClient::new(reqwest::Client::new(), DEFAULT_DATASTORE_URL);
        let args = QueryArgs {
            keyword: Some("health".into()),
            country_code: Some("KE".into()),
            ..Default::default()
        };
        let query = compile(&args, Collection::Transaction);
        let url = client.select_url(Collection::Transaction, &query).unwrap();

        assert_eq!(url.path(), "/datastore/transaction/select");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let expected: Vec<(String, String)> = [
            ("wt", "json"),
            ("rows", "10"),
            ("q", "(health) AND recipient_country_code:KE"),
        ]
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
        assert_eq!(pairs, expected);
    }
}
