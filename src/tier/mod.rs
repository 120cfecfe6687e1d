use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::models::{Profile, Tier};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TierError {
    #[error("unknown subscription tier: {0}")]
    Unknown(String),
}

/// A count cap. `Unbounded` is its own variant so no real count can collide
/// with "no limit".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Limit {
    Bounded(usize),
    Unbounded,
}

impl Limit {
    /// True when a collection of `count` items may grow by one more.
    pub fn allows_more(self, count: usize) -> bool {
        match self {
            Limit::Bounded(max) => count < max,
            Limit::Unbounded => true,
        }
    }

    /// True when a collection of `count` items is within the cap.
    pub fn admits(self, count: usize) -> bool {
        match self {
            Limit::Bounded(max) => count <= max,
            Limit::Unbounded => true,
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Bounded(max) => write!(f, "{max}"),
            Limit::Unbounded => f.write_str("∞"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierLimits {
    pub skills: Limit,
    pub bio_length: usize,
    pub portfolio_links: Limit,
    pub expires_after_days: Option<u32>,
}

const FREE_LIMITS: TierLimits = TierLimits {
    skills: Limit::Bounded(1),
    bio_length: 200,
    portfolio_links: Limit::Bounded(0),
    expires_after_days: Some(60),
};

const PRO_LIMITS: TierLimits = TierLimits {
    skills: Limit::Unbounded,
    bio_length: 500,
    portfolio_links: Limit::Bounded(3),
    expires_after_days: None,
};

const PREMIUM_LIMITS: TierLimits = TierLimits {
    skills: Limit::Unbounded,
    bio_length: 500,
    portfolio_links: Limit::Unbounded,
    expires_after_days: None,
};

impl Tier {
    pub const fn limits(self) -> TierLimits {
        match self {
            Tier::Free => FREE_LIMITS,
            Tier::Pro => PRO_LIMITS,
            Tier::Premium => PREMIUM_LIMITS,
        }
    }
}

pub fn tier_limits_for(tier: Tier) -> TierLimits {
    tier.limits()
}

pub fn tier_limits_for_name(name: &str) -> Result<TierLimits, TierError> {
    let tier: Tier = name.parse()?;
    Ok(tier.limits())
}

/// Skill comparison is exact and case-sensitive; the candidate is trimmed
/// the same way the editor trims input before storing it.
pub fn can_add_skill(current: &[String], candidate: &str, tier: Tier) -> bool {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return false;
    }
    if !tier.limits().skills.allows_more(current.len()) {
        return false;
    }
    !current.iter().any(|skill| skill == candidate)
}

/// Duplicate links are allowed; only the count is capped.
pub fn can_add_portfolio_link(current: &[String], tier: Tier) -> bool {
    tier.limits().portfolio_links.allows_more(current.len())
}

/// Truncates to the tier's bio length in characters. Borrowed when already
/// within bounds.
pub fn clamp_bio(text: &str, tier: Tier) -> Cow<'_, str> {
    let limit = tier.limits().bio_length;
    match text.char_indices().nth(limit) {
        Some((cut, _)) => Cow::Owned(text[..cut].to_string()),
        None => Cow::Borrowed(text),
    }
}

pub fn bio_within_limit(text: &str, tier: Tier) -> bool {
    text.chars().count() <= tier.limits().bio_length
}

pub fn expires_at(profile: &Profile, tier: Tier) -> Option<DateTime<Utc>> {
    let days = tier.limits().expires_after_days?;
    profile
        .last_active
        .checked_add_signed(TimeDelta::days(i64::from(days)))
}

pub fn is_expired(profile: &Profile, tier: Tier, now: DateTime<Utc>) -> bool {
    let Some(days) = tier.limits().expires_after_days else {
        return false;
    };
    now.signed_duration_since(profile.last_active) > TimeDelta::days(i64::from(days))
}
