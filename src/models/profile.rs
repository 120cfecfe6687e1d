use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::tier::TierError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Open,
    Unavailable,
}

impl Availability {
    pub fn as_str(self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::Open => "open",
            Availability::Unavailable => "unavailable",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Availability::Available => "Available Now",
            Availability::Open => "Open to Conversations",
            Availability::Unavailable => "Not Available",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenTo {
    Freelance,
    Equity,
    CoFounding,
    Advising,
    SideProjects,
    FullTime,
}

impl OpenTo {
    pub fn as_str(self) -> &'static str {
        match self {
            OpenTo::Freelance => "freelance",
            OpenTo::Equity => "equity",
            OpenTo::CoFounding => "cofounding",
            OpenTo::Advising => "advising",
            OpenTo::SideProjects => "sideprojects",
            OpenTo::FullTime => "fulltime",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OpenTo::Freelance => "Freelance Work",
            OpenTo::Equity => "Equity Opportunities",
            OpenTo::CoFounding => "Co-founding",
            OpenTo::Advising => "Advising",
            OpenTo::SideProjects => "Side Projects",
            OpenTo::FullTime => "Full-time Roles",
        }
    }
}

impl fmt::Display for OpenTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription level. Parsing an unrecognized name is an error, never a
/// fallback to `Free`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Tier {
    Free,
    Pro,
    Premium,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Pro => "pro",
            Tier::Premium => "premium",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = TierError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "free" => Ok(Tier::Free),
            "pro" => Ok(Tier::Pro),
            "premium" => Ok(Tier::Premium),
            other => Err(TierError::Unknown(other.to_string())),
        }
    }
}

impl TryFrom<String> for Tier {
    type Error = TierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bio: String,
    #[serde(default)]
    pub avatar: Option<String>,
    pub availability: Availability,
    #[serde(default, deserialize_with = "null_as_default")]
    pub open_to: Vec<OpenTo>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
    #[serde(default)]
    pub calendar_link: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub portfolio_links: Vec<String>,
    pub tier: Tier,
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub profile_views: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contact_clicks: u64,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Profile {
    pub fn has_contact_email(&self) -> bool {
        is_present(self.contact_email.as_deref())
    }

    pub fn has_social_handle(&self) -> bool {
        is_present(self.twitter.as_deref()) || is_present(self.telegram.as_deref())
    }

    pub fn has_calendar_link(&self) -> bool {
        is_present(self.calendar_link.as_deref())
    }

    pub fn has_avatar(&self) -> bool {
        is_present(self.avatar.as_deref())
    }

    pub fn has_contact_method(&self) -> bool {
        self.has_contact_email() || self.has_social_handle() || self.has_calendar_link()
    }
}

pub(crate) fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
