use crate::http::ApiError;
use crate::time::TimestampError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{} ({}): {}", .0.code, .0.status, .0.message)]
    Api(ApiError),
    #[error("config error: {0}")]
    Config(String),
}
