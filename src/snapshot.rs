use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use crate::models::{OpenTo, Profile};

/// Decodes a JSON array of profile rows as the store returns them. Missing or
/// null collections become empty; an unknown tier, availability, or open-to
/// value fails the whole snapshot with the offending record index.
pub fn decode_profiles(raw: &str) -> Result<Vec<Profile>> {
    let rows: Vec<Value> =
        serde_json::from_str(raw).context("Profile snapshot must be a JSON array")?;

    let mut profiles = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        let mut profile: Profile = serde_json::from_value(row)
            .with_context(|| format!("Failed to decode profile record {index}"))?;
        dedupe_open_to(&mut profile.open_to);
        profiles.push(profile);
    }
    Ok(profiles)
}

pub async fn load_snapshot_file(path: &Path) -> Result<Vec<Profile>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read profile snapshot {}", path.display()))?;
    let profiles = decode_profiles(&raw)
        .with_context(|| format!("Invalid profile snapshot {}", path.display()))?;
    debug!("Loaded {} profiles from {}", profiles.len(), path.display());
    Ok(profiles)
}

fn dedupe_open_to(options: &mut Vec<OpenTo>) {
    let mut seen = Vec::with_capacity(options.len());
    options.retain(|option| {
        if seen.contains(option) {
            false
        } else {
            seen.push(*option);
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Availability, Tier};

    const FULL_ROW: &str = r#"[{
        "id": "p1",
        "user_id": "u1",
        "name": "Ada Lovelace",
        "role": "Analyst",
        "location": "London",
        "bio": "First programmer.",
        "avatar": "avatars/ada.png",
        "availability": "available",
        "open_to": ["freelance", "advising", "freelance"],
        "skills": ["Rust"],
        "contact_email": "ada@example.com",
        "twitter": null,
        "telegram": "@ada",
        "calendar_link": null,
        "portfolio_links": ["https://ada.example"],
        "tier": "pro",
        "featured": true,
        "profile_views": 42,
        "contact_clicks": 7,
        "created_at": "2024-01-15T10:30:00.123456+00:00",
        "last_active": "2024-03-01T08:00:00Z"
    }]"#;

    #[test]
    fn decodes_store_rows() {
        let profiles = decode_profiles(FULL_ROW).expect("snapshot decodes");
        assert_eq!(profiles.len(), 1);
        let ada = &profiles[0];
        assert_eq!(ada.tier, Tier::Pro);
        assert_eq!(ada.availability, Availability::Available);
        assert_eq!(ada.open_to, vec![OpenTo::Freelance, OpenTo::Advising]);
        assert_eq!(ada.profile_views, 42);
        assert!(ada.featured);
        assert!(ada.has_social_handle());
        assert!(ada.created_at < ada.last_active);
    }

    #[test]
    fn missing_and_null_collections_become_empty() {
        let raw = r#"[{
            "id": "p2",
            "name": "Grace Hopper",
            "availability": "open",
            "open_to": null,
            "skills": null,
            "tier": "free",
            "created_at": "2024-01-01T00:00:00Z",
            "last_active": "2024-01-02T00:00:00Z"
        }]"#;
        let profiles = decode_profiles(raw).expect("sparse row decodes");
        let grace = &profiles[0];
        assert!(grace.open_to.is_empty());
        assert!(grace.skills.is_empty());
        assert!(grace.portfolio_links.is_empty());
        assert!(grace.role.is_empty());
        assert!(!grace.featured);
        assert_eq!(grace.contact_clicks, 0);
    }

    #[test]
    fn unknown_tier_fails_loudly() {
        let raw = FULL_ROW.replace("\"pro\"", "\"gold\"");
        let err = decode_profiles(&raw).unwrap_err();
        let rendered = format!("{err:#}");
        assert!(rendered.contains("profile record 0"), "{rendered}");
        assert!(rendered.contains("unknown subscription tier: gold"), "{rendered}");
    }

    #[test]
    fn unknown_open_to_value_fails() {
        let raw = FULL_ROW.replace("\"advising\"", "\"mentoring\"");
        assert!(decode_profiles(&raw).is_err());
    }

    #[test]
    fn non_array_snapshot_is_rejected() {
        assert!(decode_profiles("{\"profiles\": []}").is_err());
        assert!(decode_profiles("[]").expect("empty array").is_empty());
    }
}
