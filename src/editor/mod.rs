use serde::Serialize;

use crate::models::{Availability, OpenTo, Profile, Tier};
use crate::session::Session;
use crate::tier::{
    Limit, TierLimits, bio_within_limit, can_add_portfolio_link, can_add_skill, clamp_bio,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("sign in with a profile to edit it")]
    NotAuthenticated,
    #[error("{field} cannot be empty")]
    EmptyValue { field: &'static str },
    #[error("skill {0:?} is already listed")]
    DuplicateSkill(String),
    #[error("the {tier} tier allows {limit} skills")]
    SkillLimitReached { tier: Tier, limit: Limit },
    #[error("portfolio links are not available on the {tier} tier")]
    PortfolioNotAvailable { tier: Tier },
    #[error("the {tier} tier allows {limit} portfolio links")]
    PortfolioLimitReached { tier: Tier, limit: Limit },
    #[error("bio has {length} characters but the {tier} tier allows {limit}")]
    BioTooLong {
        tier: Tier,
        length: usize,
        limit: usize,
    },
    #[error("{count} skills exceed the {tier} tier limit of {limit}")]
    SkillsOverLimit { tier: Tier, count: usize, limit: Limit },
    #[error("{count} portfolio links exceed the {tier} tier limit of {limit}")]
    PortfolioOverLimit { tier: Tier, count: usize, limit: Limit },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Email,
    Twitter,
    Telegram,
    CalendarLink,
}

/// Form state for the signed-in profile. Contact fields use empty strings
/// for "not set" until the update is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub name: String,
    pub role: String,
    pub location: String,
    pub bio: String,
    pub availability: Availability,
    pub open_to: Vec<OpenTo>,
    pub skills: Vec<String>,
    pub contact_email: String,
    pub twitter: String,
    pub telegram: String,
    pub calendar_link: String,
    pub portfolio_links: Vec<String>,
}

impl ProfileDraft {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            role: profile.role.clone(),
            location: profile.location.clone(),
            bio: profile.bio.clone(),
            availability: profile.availability,
            open_to: profile.open_to.clone(),
            skills: profile.skills.clone(),
            contact_email: profile.contact_email.clone().unwrap_or_default(),
            twitter: profile.twitter.clone().unwrap_or_default(),
            telegram: profile.telegram.clone().unwrap_or_default(),
            calendar_link: profile.calendar_link.clone().unwrap_or_default(),
            portfolio_links: profile.portfolio_links.clone(),
        }
    }
}

/// Payload handed to the external store on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip)]
    pub profile_id: String,
    pub name: String,
    pub role: String,
    pub location: String,
    pub bio: String,
    pub availability: Availability,
    pub open_to: Vec<OpenTo>,
    pub skills: Vec<String>,
    pub contact_email: Option<String>,
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub calendar_link: Option<String>,
    pub portfolio_links: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ProfileEditor {
    profile_id: String,
    tier: Tier,
    draft: ProfileDraft,
}

impl ProfileEditor {
    pub fn open(session: &Session) -> Result<Self, EditorError> {
        if !session.is_authenticated() {
            return Err(EditorError::NotAuthenticated);
        }
        let profile = session.profile().ok_or(EditorError::NotAuthenticated)?;
        Ok(Self {
            profile_id: profile.id.clone(),
            tier: profile.tier,
            draft: ProfileDraft::from_profile(profile),
        })
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn limits(&self) -> TierLimits {
        self.tier.limits()
    }

    pub fn draft(&self) -> &ProfileDraft {
        &self.draft
    }

    pub fn set_name(&mut self, value: &str) {
        self.draft.name = value.to_string();
    }

    pub fn set_role(&mut self, value: &str) {
        self.draft.role = value.to_string();
    }

    pub fn set_location(&mut self, value: &str) {
        self.draft.location = value.to_string();
    }

    pub fn set_availability(&mut self, availability: Availability) {
        self.draft.availability = availability;
    }

    pub fn set_contact(&mut self, field: ContactField, value: &str) {
        let slot = match field {
            ContactField::Email => &mut self.draft.contact_email,
            ContactField::Twitter => &mut self.draft.twitter,
            ContactField::Telegram => &mut self.draft.telegram,
            ContactField::CalendarLink => &mut self.draft.calendar_link,
        };
        *slot = value.to_string();
    }

    /// Stores at most the tier's bio length. Returns true when input was cut.
    pub fn set_bio(&mut self, text: &str) -> bool {
        let clamped = clamp_bio(text, self.tier);
        let truncated = clamped.len() < text.len();
        self.draft.bio = clamped.into_owned();
        truncated
    }

    pub fn add_skill(&mut self, raw: &str) -> Result<(), EditorError> {
        let skill = raw.trim();
        if skill.is_empty() {
            return Err(EditorError::EmptyValue { field: "skill" });
        }
        if !can_add_skill(&self.draft.skills, skill, self.tier) {
            let limit = self.limits().skills;
            if !limit.allows_more(self.draft.skills.len()) {
                return Err(EditorError::SkillLimitReached {
                    tier: self.tier,
                    limit,
                });
            }
            return Err(EditorError::DuplicateSkill(skill.to_string()));
        }
        self.draft.skills.push(skill.to_string());
        Ok(())
    }

    pub fn remove_skill(&mut self, skill: &str) -> bool {
        let before = self.draft.skills.len();
        self.draft.skills.retain(|s| s != skill);
        self.draft.skills.len() != before
    }

    pub fn add_portfolio_link(&mut self, raw: &str) -> Result<(), EditorError> {
        let link = raw.trim();
        if link.is_empty() {
            return Err(EditorError::EmptyValue {
                field: "portfolio link",
            });
        }
        if !can_add_portfolio_link(&self.draft.portfolio_links, self.tier) {
            let limit = self.limits().portfolio_links;
            if limit == Limit::Bounded(0) {
                return Err(EditorError::PortfolioNotAvailable { tier: self.tier });
            }
            return Err(EditorError::PortfolioLimitReached {
                tier: self.tier,
                limit,
            });
        }
        self.draft.portfolio_links.push(link.to_string());
        Ok(())
    }

    pub fn remove_portfolio_link(&mut self, link: &str) -> bool {
        let before = self.draft.portfolio_links.len();
        self.draft.portfolio_links.retain(|l| l != link);
        self.draft.portfolio_links.len() != before
    }

    pub fn toggle_open_to(&mut self, option: OpenTo) {
        if let Some(index) = self.draft.open_to.iter().position(|o| *o == option) {
            self.draft.open_to.remove(index);
        } else {
            self.draft.open_to.push(option);
        }
    }

    pub fn skill_counter(&self) -> String {
        format!("{} of {}", self.draft.skills.len(), self.limits().skills)
    }

    pub fn portfolio_counter(&self) -> String {
        format!(
            "{} of {}",
            self.draft.portfolio_links.len(),
            self.limits().portfolio_links
        )
    }

    /// Final gate before the save is dispatched. Drafts loaded from a profile
    /// whose tier has since been lowered fail here until trimmed.
    pub fn finish(&self) -> Result<ProfileUpdate, EditorError> {
        let limits = self.limits();
        let draft = &self.draft;

        if !limits.skills.admits(draft.skills.len()) {
            return Err(EditorError::SkillsOverLimit {
                tier: self.tier,
                count: draft.skills.len(),
                limit: limits.skills,
            });
        }
        if !bio_within_limit(&draft.bio, self.tier) {
            return Err(EditorError::BioTooLong {
                tier: self.tier,
                length: draft.bio.chars().count(),
                limit: limits.bio_length,
            });
        }
        if !limits.portfolio_links.admits(draft.portfolio_links.len()) {
            return Err(EditorError::PortfolioOverLimit {
                tier: self.tier,
                count: draft.portfolio_links.len(),
                limit: limits.portfolio_links,
            });
        }

        let mut open_to = Vec::with_capacity(draft.open_to.len());
        for option in &draft.open_to {
            if !open_to.contains(option) {
                open_to.push(*option);
            }
        }

        Ok(ProfileUpdate {
            profile_id: self.profile_id.clone(),
            name: draft.name.trim().to_string(),
            role: draft.role.trim().to_string(),
            location: draft.location.trim().to_string(),
            bio: draft.bio.clone(),
            availability: draft.availability,
            open_to,
            skills: draft.skills.clone(),
            contact_email: optional_text(&draft.contact_email),
            twitter: optional_text(&draft.twitter),
            telegram: optional_text(&draft.telegram),
            calendar_link: optional_text(&draft.calendar_link),
            portfolio_links: draft.portfolio_links.clone(),
        })
    }
}

fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
