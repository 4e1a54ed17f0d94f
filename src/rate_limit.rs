//! Rate-limit snapshots and the policy for keeping the freshest one.
//!
//! GitHub reports quota state on every response, but responses can arrive
//! out of order. [`should_replace`] decides whether a newly observed record
//! supersedes the cached one, and [`RateLimitTracker`] applies that decision
//! atomically per category.

use crate::time;
use chrono::{DateTime, Utc};
use log::debug;
use serde::Deserialize;
use std::sync::Mutex;

/// Seconds after construction at which an [`RateLimitRecord::Unknown`] resets.
pub const UNKNOWN_RESET_SECONDS: i64 = 30;

/// A single observation of one rate-limit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitRecord {
    Known {
        limit: u32,
        remaining: u32,
        reset_epoch_seconds: i64,
    },
    /// Placeholder used until the server has reported anything.
    Unknown { reset_epoch_seconds: i64 },
}

impl RateLimitRecord {
    pub fn new(limit: u32, remaining: u32, reset_epoch_seconds: i64) -> Self {
        Self::Known {
            limit,
            remaining,
            reset_epoch_seconds,
        }
    }

    /// An Unknown record created now. Two placeholders created in different
    /// seconds compare as distinct observations.
    pub fn unknown() -> Self {
        Self::unknown_at(Utc::now())
    }

    pub fn unknown_at(now: DateTime<Utc>) -> Self {
        Self::Unknown {
            reset_epoch_seconds: now.timestamp() + UNKNOWN_RESET_SECONDS,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown { .. })
    }

    /// Total permitted requests; `u32::MAX` when unknown.
    pub fn limit(&self) -> u32 {
        match self {
            Self::Known { limit, .. } => *limit,
            Self::Unknown { .. } => u32::MAX,
        }
    }

    /// Requests left in the window; `u32::MAX` when unknown.
    pub fn remaining(&self) -> u32 {
        match self {
            Self::Known { remaining, .. } => *remaining,
            Self::Unknown { .. } => u32::MAX,
        }
    }

    pub fn reset_epoch_seconds(&self) -> i64 {
        match self {
            Self::Known {
                reset_epoch_seconds,
                ..
            }
            | Self::Unknown {
                reset_epoch_seconds,
            } => *reset_epoch_seconds,
        }
    }

    /// Reset time as an instant, `None` if out of chrono's range.
    pub fn reset_date(&self) -> Option<DateTime<Utc>> {
        time::parse_epoch_seconds(self.reset_epoch_seconds())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.reset_epoch_seconds() <= now.timestamp()
    }
}

/// Whether `candidate` should replace the cached `current` record.
///
/// Known data always beats a placeholder, and a placeholder never displaces
/// known data. Between two placeholders the later one wins. Between two
/// observations a later reset means a newer window and wins outright; within
/// the same window the lower remaining count wins.
pub fn should_replace(candidate: &RateLimitRecord, current: &RateLimitRecord) -> bool {
    use RateLimitRecord::{Known, Unknown};

    if candidate == current {
        return false;
    }
    match (candidate, current) {
        (Known { .. }, Unknown { .. }) => true,
        (Unknown { .. }, Known { .. }) => false,
        (
            Unknown {
                reset_epoch_seconds: candidate_reset,
            },
            Unknown {
                reset_epoch_seconds: current_reset,
            },
        ) => candidate_reset > current_reset,
        (
            Known {
                remaining: candidate_remaining,
                reset_epoch_seconds: candidate_reset,
                ..
            },
            Known {
                remaining: current_remaining,
                reset_epoch_seconds: current_reset,
                ..
            },
        ) => {
            candidate_reset > current_reset
                || (candidate_reset == current_reset && candidate_remaining < current_remaining)
        }
    }
}

/// Which rate-limit bucket a request counts against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitTarget {
    Core,
    Search,
    Graphql,
    IntegrationManifest,
}

impl RateLimitTarget {
    pub fn from_path(path: &str) -> Self {
        let path = path.split('?').next().unwrap_or(path);
        if path == "/search" || path.starts_with("/search/") {
            Self::Search
        } else if path == "/graphql" {
            Self::Graphql
        } else if path.starts_with("/app-manifests/") {
            Self::IntegrationManifest
        } else {
            Self::Core
        }
    }
}

/// The full set of buckets the service reports on `/rate_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub core: RateLimitRecord,
    pub search: RateLimitRecord,
    pub graphql: RateLimitRecord,
    pub integration_manifest: RateLimitRecord,
}

impl RateLimit {
    pub fn unknown() -> Self {
        let placeholder = RateLimitRecord::unknown();
        Self {
            core: placeholder,
            search: placeholder,
            graphql: placeholder,
            integration_manifest: placeholder,
        }
    }

    pub fn record(&self, target: RateLimitTarget) -> RateLimitRecord {
        match target {
            RateLimitTarget::Core => self.core,
            RateLimitTarget::Search => self.search,
            RateLimitTarget::Graphql => self.graphql,
            RateLimitTarget::IntegrationManifest => self.integration_manifest,
        }
    }

    fn record_mut(&mut self, target: RateLimitTarget) -> &mut RateLimitRecord {
        match target {
            RateLimitTarget::Core => &mut self.core,
            RateLimitTarget::Search => &mut self.search,
            RateLimitTarget::Graphql => &mut self.graphql,
            RateLimitTarget::IntegrationManifest => &mut self.integration_manifest,
        }
    }
}

// Wire shape of `GET /rate_limit`.
#[derive(Debug, Deserialize)]
struct RateLimitPayload {
    resources: Resources,
}

#[derive(Debug, Deserialize)]
struct Resources {
    core: Option<WireRecord>,
    search: Option<WireRecord>,
    graphql: Option<WireRecord>,
    integration_manifest: Option<WireRecord>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct WireRecord {
    limit: u32,
    remaining: u32,
    reset: i64,
}

impl From<WireRecord> for RateLimitRecord {
    fn from(w: WireRecord) -> Self {
        RateLimitRecord::new(w.limit, w.remaining, w.reset)
    }
}

impl<'de> Deserialize<'de> for RateLimit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let payload = RateLimitPayload::deserialize(deserializer)?;
        let placeholder = RateLimitRecord::unknown();
        let pick = |w: Option<WireRecord>| w.map(RateLimitRecord::from).unwrap_or(placeholder);
        Ok(Self {
            core: pick(payload.resources.core),
            search: pick(payload.resources.search),
            graphql: pick(payload.resources.graphql),
            integration_manifest: pick(payload.resources.integration_manifest),
        })
    }
}

/// Cache of the most relevant rate-limit state seen so far.
///
/// Every update is a compare-and-swap under one lock, so concurrent
/// responses cannot both replace based on a stale read.
#[derive(Debug)]
pub struct RateLimitTracker {
    current: Mutex<RateLimit>,
}

impl Default for RateLimitTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimitTracker {
    pub fn new() -> Self {
        Self::with_initial(RateLimit::unknown())
    }

    pub fn with_initial(initial: RateLimit) -> Self {
        Self {
            current: Mutex::new(initial),
        }
    }

    /// Offer a new observation; returns true when it replaced the cached one.
    pub fn update(&self, target: RateLimitTarget, candidate: RateLimitRecord) -> bool {
        let mut guard = self.current.lock().unwrap_or_else(|e| e.into_inner());
        let slot = guard.record_mut(target);
        if should_replace(&candidate, slot) {
            debug!("rate limit {:?}: {:?} -> {:?}", target, slot, candidate);
            *slot = candidate;
            true
        } else {
            false
        }
    }

    pub fn update_all(&self, observed: &RateLimit) {
        for target in [
            RateLimitTarget::Core,
            RateLimitTarget::Search,
            RateLimitTarget::Graphql,
            RateLimitTarget::IntegrationManifest,
        ] {
            self.update(target, observed.record(target));
        }
    }

    pub fn snapshot(&self) -> RateLimit {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn record(&self, target: RateLimitTarget) -> RateLimitRecord {
        self.snapshot().record(target)
    }
}
