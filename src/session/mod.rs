use crate::models::{Profile, Tier};

/// Signed-in state handed explicitly to the flows that need it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    account_id: Option<String>,
    profile: Option<Profile>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("account id must be non-empty")]
    EmptyAccount,
    #[error("profile {profile_id} does not belong to the signed-in account")]
    ForeignProfile { profile_id: String },
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The profile, when given, must be owned by `account_id`; the same rule
    /// `refresh_profile` applies.
    pub fn signed_in(
        account_id: impl Into<String>,
        profile: Option<Profile>,
    ) -> Result<Self, SessionError> {
        let account_id = account_id.into();
        if account_id.is_empty() {
            return Err(SessionError::EmptyAccount);
        }
        if let Some(profile) = &profile {
            if !owned_by(profile, &account_id) {
                return Err(SessionError::ForeignProfile {
                    profile_id: profile.id.clone(),
                });
            }
        }
        Ok(Self {
            account_id: Some(account_id),
            profile,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.account_id.is_some()
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn tier(&self) -> Option<Tier> {
        self.profile.as_ref().map(|profile| profile.tier)
    }

    /// Swaps in a fresher copy of the signed-in profile, e.g. after a save or
    /// a pushed snapshot. Profiles owned by other accounts are ignored.
    pub fn refresh_profile(&mut self, profile: Profile) -> bool {
        let owns = self
            .account_id
            .as_deref()
            .is_some_and(|account| owned_by(&profile, account));
        if owns {
            self.profile = Some(profile);
        }
        owns
    }
}

fn owned_by(profile: &Profile, account_id: &str) -> bool {
    !profile.user_id.is_empty() && profile.user_id == account_id
}
