//! Rate-limit policy table.
//!
//! Each route class has a fixed request ceiling per window. The table is data
//! so the ceilings live in one place; the API crate's middleware looks up the
//! policy for a class and counts requests in fixed windows.

use std::fmt;
use std::time::Duration;

/// Route classes with distinct ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateClass {
    /// Anonymous reads of `/api/public/*`.
    PublicRead,
    /// Login attempts.
    Auth,
    /// Authenticated CMS reads.
    CmsRead,
    /// Authenticated CMS creates and updates.
    CmsWrite,
    /// Image uploads.
    Storage,
    /// Deletes of content or stored objects.
    Delete,
}

impl RateClass {
    /// Key segment used in the counter key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PublicRead => "public",
            Self::Auth => "auth",
            Self::CmsRead => "cms_read",
            Self::CmsWrite => "cms_write",
            Self::Storage => "storage",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for RateClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ceiling for one route class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    pub class: RateClass,
    pub max_requests: u64,
    pub window: Duration,
}

const MINUTE: u64 = 60;

/// Per-class ceilings.
pub const POLICIES: [RatePolicy; 6] = [
    RatePolicy {
        class: RateClass::PublicRead,
        max_requests: 100,
        window: Duration::from_secs(MINUTE),
    },
    RatePolicy {
        class: RateClass::Auth,
        max_requests: 10,
        window: Duration::from_secs(15 * MINUTE),
    },
    RatePolicy {
        class: RateClass::CmsRead,
        max_requests: 300,
        window: Duration::from_secs(5 * MINUTE),
    },
    RatePolicy {
        class: RateClass::CmsWrite,
        max_requests: 100,
        window: Duration::from_secs(5 * MINUTE),
    },
    RatePolicy {
        class: RateClass::Storage,
        max_requests: 20,
        window: Duration::from_secs(60 * MINUTE),
    },
    RatePolicy {
        class: RateClass::Delete,
        max_requests: 30,
        window: Duration::from_secs(10 * MINUTE),
    },
];

/// Look up the policy for a class.
pub fn policy_for(class: RateClass) -> RatePolicy {
    POLICIES
        .iter()
        .copied()
        .find(|p| p.class == class)
        .unwrap_or(POLICIES[0])
}

impl RatePolicy {
    /// Start (unix seconds) of the fixed window containing `now_secs`.
    pub fn window_start(&self, now_secs: u64) -> u64 {
        let window = self.window.as_secs().max(1);
        now_secs - now_secs % window
    }

    /// Seconds until the window containing `now_secs` closes.
    pub fn retry_after(&self, now_secs: u64) -> u64 {
        let window = self.window.as_secs().max(1);
        (self.window_start(now_secs) + window - now_secs).max(1)
    }

    /// Counter key for `identity` in the window containing `now_secs`.
    pub fn counter_key(&self, identity: &str, now_secs: u64) -> String {
        format!(
            "ratelimit:{}:{identity}:{}",
            self.class,
            self.window_start(now_secs)
        )
    }
}
