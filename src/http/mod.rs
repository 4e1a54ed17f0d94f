use crate::config::Config;
use crate::error::{Error, Result};
use crate::mapping;
use crate::model::Repository;
use crate::rate_limit::{RateLimit, RateLimitRecord, RateLimitTarget, RateLimitTracker};
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    retriable: bool,
    pub status: u16,
}

impl ApiError {
    /// Whether repeating the same request later can succeed (quota
    /// exhausted, upstream failure). The client itself never retries.
    pub fn is_retriable(&self) -> bool {
        self.retriable
    }
}

pub fn build_client(cfg: &Config) -> Result<Client> {
    let mut default_headers = HeaderMap::new();
    let ua = HeaderValue::from_str(&cfg.user_agent)
        .map_err(|e| Error::Config(format!("invalid user agent: {}", e)))?;
    default_headers.insert(USER_AGENT, ua);
    // Authorization header is injected per request so anonymous clients work too.
    let client = Client::builder()
        .default_headers(default_headers)
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .use_rustls_tls()
        .build()?;
    Ok(client)
}

pub fn map_status_to_error(status: StatusCode, message: String) -> ApiError {
    let (code, retriable) = match status {
        StatusCode::BAD_REQUEST => ("bad_request", false),
        StatusCode::UNAUTHORIZED => ("unauthorized", false),
        StatusCode::FORBIDDEN => ("forbidden", false),
        StatusCode::NOT_FOUND => ("not_found", false),
        StatusCode::CONFLICT => ("conflict", false),
        StatusCode::TOO_MANY_REQUESTS => ("rate_limited", true),
        s if s.is_server_error() => ("upstream_error", true),
        _ => ("server_error", false),
    };
    ApiError {
        code: code.to_string(),
        message,
        retriable,
        status: status.as_u16(),
    }
}

/// Like [`map_status_to_error`], but a 403 whose headers show an exhausted
/// quota is GitHub's primary rate limit, not a permission problem.
pub fn map_response_error(
    status: StatusCode,
    rate: Option<&RateLimitRecord>,
    message: String,
) -> ApiError {
    let exhausted = rate.is_some_and(|r| !r.is_unknown() && r.remaining() == 0);
    if status == StatusCode::FORBIDDEN && exhausted {
        return ApiError {
            code: "rate_limited".to_string(),
            message,
            retriable: true,
            status: status.as_u16(),
        };
    }
    map_status_to_error(status, message)
}

/// Build a record from `x-ratelimit-*` headers; `None` unless all three
/// are present and numeric.
pub fn extract_rate_record(headers: &HeaderMap) -> Option<RateLimitRecord> {
    fn header<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<T>().ok())
    }
    let limit = header::<u32>(headers, "x-ratelimit-limit")?;
    let remaining = header::<u32>(headers, "x-ratelimit-remaining")?;
    let reset = header::<i64>(headers, "x-ratelimit-reset")?;
    Some(RateLimitRecord::new(limit, remaining, reset))
}

/// Thin REST transport. Clones share the connection pool and the
/// rate-limit cache.
#[derive(Clone)]
pub struct GitHubClient {
    http: Client,
    cfg: Config,
    rate_limits: Arc<RateLimitTracker>,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.cfg.api_url)
            .field("authenticated", &self.cfg.token.is_some())
            .finish()
    }
}

impl GitHubClient {
    pub fn new(cfg: Config) -> Result<Self> {
        let http = build_client(&cfg)?;
        Ok(Self {
            http,
            cfg,
            rate_limits: Arc::new(RateLimitTracker::new()),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env().map_err(Error::Config)?)
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// GET `path` relative to the API root and map the body to `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.cfg.api_url, path);
        let mut req = self
            .http
            .get(&url)
            .header("X-GitHub-Api-Version", &self.cfg.api_version)
            .header(
                ACCEPT,
                HeaderValue::from_static("application/vnd.github+json"),
            );
        if let Some(token) = &self.cfg.token {
            req = req.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        let res = req.send().await?;

        let status = res.status();
        let observed = self.observe_rate_limit(path, res.headers());
        let text = res.text().await?;
        if !status.is_success() {
            let err = map_response_error(status, observed.as_ref(), text);
            warn!("REST GET {} failed with status {} ({})", url, status, err.code);
            return Err(Error::Api(err));
        }
        Ok(mapping::from_str(&text)?)
    }

    pub async fn get_repository(&self, owner: &str, repo: &str) -> Result<Repository> {
        let mut repository: Repository = self
            .get_json(&format!("/repos/{}/{}", owner, repo))
            .await?;
        repository.root = Some(self.clone());
        Ok(repository)
    }

    /// Fetch `/rate_limit`, fold it into the cache and return the cached view.
    pub async fn rate_limit(&self) -> Result<RateLimit> {
        let observed: RateLimit = self.get_json("/rate_limit").await?;
        self.rate_limits.update_all(&observed);
        Ok(self.rate_limits.snapshot())
    }

    /// Cached rate-limit state without a request.
    pub fn last_rate_limit(&self) -> RateLimit {
        self.rate_limits.snapshot()
    }

    fn observe_rate_limit(&self, path: &str, headers: &HeaderMap) -> Option<RateLimitRecord> {
        let Some(record) = extract_rate_record(headers) else {
            debug!("no rate limit headers on response for {}", path);
            return None;
        };
        self.rate_limits
            .update(RateLimitTarget::from_path(path), record);
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_mapping_matrix() {
        assert_eq!(
            map_status_to_error(StatusCode::BAD_REQUEST, "".into()).code,
            "bad_request"
        );
        assert_eq!(
            map_status_to_error(StatusCode::UNAUTHORIZED, "".into()).code,
            "unauthorized"
        );
        assert_eq!(
            map_status_to_error(StatusCode::FORBIDDEN, "".into()).code,
            "forbidden"
        );
        assert_eq!(
            map_status_to_error(StatusCode::NOT_FOUND, "".into()).code,
            "not_found"
        );
        assert_eq!(
            map_status_to_error(StatusCode::CONFLICT, "".into()).code,
            "conflict"
        );
        let rl = map_status_to_error(StatusCode::TOO_MANY_REQUESTS, "".into());
        assert_eq!(rl.code, "rate_limited");
        assert!(rl.is_retriable());
        assert_eq!(rl.status, 429);
        let s5 = map_status_to_error(StatusCode::INTERNAL_SERVER_ERROR, "".into());
        assert_eq!(s5.code, "upstream_error");
        assert!(s5.is_retriable());
    }

    #[test]
    fn forbidden_with_exhausted_quota_is_rate_limited() {
        let exhausted = RateLimitRecord::new(60, 0, 1_700_000_000);
        let e = map_response_error(StatusCode::FORBIDDEN, Some(&exhausted), "".into());
        assert_eq!(e.code, "rate_limited");
        assert!(e.is_retriable());
        assert_eq!(e.status, 403);

        let left = RateLimitRecord::new(60, 12, 1_700_000_000);
        let e = map_response_error(StatusCode::FORBIDDEN, Some(&left), "".into());
        assert_eq!(e.code, "forbidden");
        assert!(!e.is_retriable());

        let e = map_response_error(StatusCode::FORBIDDEN, None, "".into());
        assert_eq!(e.code, "forbidden");

        let e = map_response_error(StatusCode::NOT_FOUND, Some(&exhausted), "".into());
        assert_eq!(e.code, "not_found");
    }

    #[test]
    fn rate_headers_need_all_three_values() {
        let mut h = HeaderMap::new();
        h.insert("x-ratelimit-limit", "5000".parse().unwrap());
        h.insert("x-ratelimit-remaining", "4999".parse().unwrap());
        assert_eq!(extract_rate_record(&h), None);

        h.insert("x-ratelimit-reset", "1700000000".parse().unwrap());
        assert_eq!(
            extract_rate_record(&h),
            Some(RateLimitRecord::new(5000, 4999, 1_700_000_000))
        );

        h.insert("x-ratelimit-remaining", "lots".parse().unwrap());
        assert_eq!(extract_rate_record(&h), None);
    }

    #[test]
    fn debug_does_not_leak_token() {
        let mut cfg = Config::with_api_url("http://localhost:1");
        cfg.token = Some("secret-token".into());
        let client = GitHubClient::new(cfg).unwrap();
        let dbg = format!("{:?}", client);
        assert!(!dbg.contains("secret-token"));
        assert!(dbg.contains("authenticated: true"));
    }
}
