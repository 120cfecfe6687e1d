use serde::Serialize;

use crate::models::Profile;

const MIN_BIO_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletenessCheck {
    Name,
    Role,
    Location,
    Bio,
    Avatar,
    Skills,
    OpenTo,
    ContactEmail,
    SocialHandle,
    PortfolioLinks,
}

impl CompletenessCheck {
    pub const ALL: [CompletenessCheck; 10] = [
        CompletenessCheck::Name,
        CompletenessCheck::Role,
        CompletenessCheck::Location,
        CompletenessCheck::Bio,
        CompletenessCheck::Avatar,
        CompletenessCheck::Skills,
        CompletenessCheck::OpenTo,
        CompletenessCheck::ContactEmail,
        CompletenessCheck::SocialHandle,
        CompletenessCheck::PortfolioLinks,
    ];

    pub fn is_satisfied(self, profile: &Profile) -> bool {
        match self {
            CompletenessCheck::Name => !profile.name.trim().is_empty(),
            CompletenessCheck::Role => !profile.role.trim().is_empty(),
            CompletenessCheck::Location => !profile.location.trim().is_empty(),
            CompletenessCheck::Bio => profile.bio.chars().count() > MIN_BIO_CHARS,
            CompletenessCheck::Avatar => profile.has_avatar(),
            CompletenessCheck::Skills => !profile.skills.is_empty(),
            CompletenessCheck::OpenTo => !profile.open_to.is_empty(),
            CompletenessCheck::ContactEmail => profile.has_contact_email(),
            CompletenessCheck::SocialHandle => profile.has_social_handle(),
            CompletenessCheck::PortfolioLinks => !profile.portfolio_links.is_empty(),
        }
    }

    pub fn nudge(self) -> &'static str {
        match self {
            CompletenessCheck::Name => "Add your name",
            CompletenessCheck::Role => "Add your role",
            CompletenessCheck::Location => "Add your location",
            CompletenessCheck::Bio => "Write a short bio",
            CompletenessCheck::Avatar => "Upload a profile photo",
            CompletenessCheck::Skills => "List at least one skill",
            CompletenessCheck::OpenTo => "Pick what you are open to",
            CompletenessCheck::ContactEmail => "Add a contact email",
            CompletenessCheck::SocialHandle => "Link Twitter or Telegram",
            CompletenessCheck::PortfolioLinks => "Add a portfolio link",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completeness {
    pub percent: u8,
    pub missing: Vec<CompletenessCheck>,
}

impl Completeness {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

pub fn assess(profile: &Profile) -> Completeness {
    let missing: Vec<CompletenessCheck> = CompletenessCheck::ALL
        .into_iter()
        .filter(|check| !check.is_satisfied(profile))
        .collect();
    let total = CompletenessCheck::ALL.len();
    let satisfied = total - missing.len();
    Completeness {
        percent: percent_of(satisfied, total),
        missing,
    }
}

pub fn completeness_percent(profile: &Profile) -> u8 {
    assess(profile).percent
}

fn percent_of(satisfied: usize, total: usize) -> u8 {
    assert!(total > 0, "completeness needs at least one check");
    assert!(satisfied <= total, "satisfied checks exceed total");
    ((satisfied as f64 / total as f64) * 100.0).round() as u8
}
