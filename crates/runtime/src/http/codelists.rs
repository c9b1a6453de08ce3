//! Codelist downloads from the IATI reference site.

use super::{get_json, join_url};
use crate::{Error, Result};
use codelist::CodelistSource;
use serde_json::Value;

/// Published JSON codelists (version 2.03, English).
pub const DEFAULT_CODELIST_URL: &str =
    "https://iatistandard.org/reference_downloads/203/codelists/downloads/clv3/json/en";

/// Fetches `<base>/<Name>.json` documents.
#[derive(Debug, Clone)]
pub struct HttpCodelistSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCodelistSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn url_for(&self, name: &str) -> Result<reqwest::Url> {
        let url = join_url(&self.base_url, &format!("{name}.json"));
        reqwest::Url::parse(&url)
            .map_err(|e| Error::Config(format!("invalid codelist url {url}: {e}")))
    }

    /// Fetch the document for `name`, bypassing any cache.
    pub async fn fetch_document(&self, name: &str) -> Result<Value> {
        get_json(&self.client, self.url_for(name)?).await
    }
}

impl CodelistSource for HttpCodelistSource {
    async fn fetch(&self, name: &str) -> codelist::Result<Value> {
        self.fetch_document(name)
            .await
            .map_err(|e| codelist::Error::Source(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_codelist_url() {
        let source = HttpCodelistSource::new(reqwest::Client::new(), DEFAULT_CODELIST_URL);
        assert_eq!(
            source.url_for("ActivityStatus").unwrap().as_str(),
            "https://iatistandard.org/reference_downloads/203/codelists/downloads/clv3/json/en/ActivityStatus.json"
        );
    }
}
