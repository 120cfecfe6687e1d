pub mod completeness;
pub mod config;
pub mod directory;
pub mod editor;
pub mod feed;
pub mod models;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod tier;

pub use directory::{AvailabilityFilter, FilterSpec, SearchScope, SortOrder, filter_profiles};
pub use models::{Availability, OpenTo, Profile, Tier};
pub use tier::{
    Limit, TierError, TierLimits, can_add_portfolio_link, can_add_skill, clamp_bio, is_expired,
    tier_limits_for, tier_limits_for_name,
};
