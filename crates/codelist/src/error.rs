use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("codelist source error: {0}")]
    Source(String),

    #[error("malformed codelist document: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
