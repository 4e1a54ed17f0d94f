//! Generic object mapping: typed data objects to JSON text and back.
//!
//! This is the path external callers use to bind data objects without going
//! through [`GitHubClient`](crate::http::GitHubClient). Anything only the
//! client can populate (such as [`Repository::root`](crate::model::Repository::root))
//! is left empty.

use serde::de::DeserializeOwned;
use serde::Serialize;

pub fn to_string<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value)
}

pub fn from_str<T: DeserializeOwned>(text: &str) -> serde_json::Result<T> {
    serde_json::from_str(text)
}
