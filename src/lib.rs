//! Core pieces of a GitHub REST client: the timestamp codec, rate-limit
//! tracking, and data objects that round-trip through JSON.

pub mod config;
pub mod error;
pub mod http;
pub mod mapping;
pub mod model;
pub mod rate_limit;
pub mod time;

pub use error::{Error, Result};
pub use http::GitHubClient;
pub use rate_limit::{should_replace, RateLimit, RateLimitRecord, RateLimitTarget};
pub use time::{parse_date, print_date, TimestampError};
