use crate::http::GitHubClient;
use crate::time::{serde_date, serde_date_opt};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: Owner,
    pub private: bool,
    pub fork: bool,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(with = "serde_date")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "serde_date")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, with = "serde_date_opt")]
    pub pushed_at: Option<DateTime<Utc>>,
    /// Owning client. Set by [`GitHubClient::get_repository`]; not
    /// populated by generic deserialization.
    #[serde(skip)]
    pub root: Option<GitHubClient>,
}

impl Repository {
    pub fn root(&self) -> Option<&GitHubClient> {
        self.root.as_ref()
    }
}
