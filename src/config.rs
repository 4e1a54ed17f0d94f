use std::env;
use url::Url;

/// Runtime configuration for the GitHub REST client.
/// Values are sourced from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: Option<String>,
    pub api_url: String,
    pub api_version: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            api_url: "https://api.github.com".to_string(),
            api_version: "2022-11-28".to_string(),
            user_agent: default_user_agent(),
            timeout_secs: 30,
        }
    }
}

fn default_user_agent() -> String {
    format!("github-client/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Load configuration from environment.
    ///
    /// Env vars:
    /// - GITHUB_TOKEN (or GH_TOKEN) [optional; anonymous when absent]
    /// - GITHUB_API_URL (default: https://api.github.com)
    /// - GITHUB_API_VERSION (default: 2022-11-28)
    /// - GITHUB_HTTP_TIMEOUT_SECS (default: 30)
    /// - GITHUB_USER_AGENT (default: github-client/<version>)
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();
        let token = env::var("GITHUB_TOKEN")
            .or_else(|_| env::var("GH_TOKEN"))
            .ok()
            .filter(|t| !t.trim().is_empty());

        let api_url = env::var("GITHUB_API_URL").unwrap_or(defaults.api_url);
        Url::parse(&api_url).map_err(|e| format!("Invalid GITHUB_API_URL {}: {}", api_url, e))?;
        let api_url = api_url.trim_end_matches('/').to_string();

        let api_version = env::var("GITHUB_API_VERSION").unwrap_or(defaults.api_version);
        let timeout_secs = env::var("GITHUB_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.timeout_secs);
        let user_agent = env::var("GITHUB_USER_AGENT").unwrap_or(defaults.user_agent);

        Ok(Self {
            token,
            api_url,
            api_version,
            user_agent,
            timeout_secs,
        })
    }

    /// Same defaults, pointed at a different API root (test servers, GHES).
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_override_trims_trailing_slash() {
        let cfg = Config::with_api_url("http://127.0.0.1:8080/");
        assert_eq!(cfg.api_url, "http://127.0.0.1:8080");
        assert_eq!(cfg.api_version, "2022-11-28");
        assert!(cfg.token.is_none());
        assert!(cfg.user_agent.starts_with("github-client/"));
    }
}
