use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{Availability, OpenTo, Profile};

const ALL_SENTINEL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Featured,
    Recent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityFilter {
    #[default]
    All,
    Available,
    Open,
    Unavailable,
}

impl AvailabilityFilter {
    pub fn matches(self, availability: Availability) -> bool {
        match self {
            AvailabilityFilter::All => true,
            AvailabilityFilter::Available => availability == Availability::Available,
            AvailabilityFilter::Open => availability == Availability::Open,
            AvailabilityFilter::Unavailable => availability == Availability::Unavailable,
        }
    }
}

impl From<Availability> for AvailabilityFilter {
    fn from(value: Availability) -> Self {
        match value {
            Availability::Available => AvailabilityFilter::Available,
            Availability::Open => AvailabilityFilter::Open,
            Availability::Unavailable => AvailabilityFilter::Unavailable,
        }
    }
}

/// Fields the free-text search looks at. Location also has its own
/// exact-match filter, so it is opt-in here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    #[default]
    NameRoleSkills,
    WithLocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub search: String,
    pub availability: AvailabilityFilter,
    pub open_to: BTreeSet<OpenTo>,
    pub location: Option<String>,
    pub skill: Option<String>,
    pub sort_by: SortOrder,
    pub search_scope: SearchScope,
}

impl FilterSpec {
    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn with_availability(mut self, availability: AvailabilityFilter) -> Self {
        self.availability = availability;
        self
    }

    pub fn with_open_to(mut self, options: impl IntoIterator<Item = OpenTo>) -> Self {
        self.open_to = options.into_iter().collect();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skill = Some(skill.into());
        self
    }

    pub fn sorted_by(mut self, sort_by: SortOrder) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn with_search_scope(mut self, scope: SearchScope) -> Self {
        self.search_scope = scope;
        self
    }

    pub fn toggle_open_to(&mut self, option: OpenTo) {
        if !self.open_to.remove(&option) {
            self.open_to.insert(option);
        }
    }

    pub fn active_filter_count(&self) -> usize {
        [
            self.search_term().is_some(),
            self.availability != AvailabilityFilter::All,
            !self.open_to.is_empty(),
            self.location_filter().is_some(),
            self.skill_filter().is_some(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    /// Lowercased search term, or `None` when blank.
    pub fn search_term(&self) -> Option<String> {
        // Trimmed, so "ace " still matches "Ada Lovelace".
        let trimmed = self.search.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        }
    }

    pub fn location_filter(&self) -> Option<&str> {
        exact_value(self.location.as_deref())
    }

    pub fn skill_filter(&self) -> Option<&str> {
        exact_value(self.skill.as_deref())
    }
}

fn exact_value(value: Option<&str>) -> Option<&str> {
    let trimmed = value?.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_SENTINEL) {
        None
    } else {
        Some(trimmed)
    }
}

/// Applies every active predicate and orders the survivors. The input slice
/// is never reordered; the result borrows from it.
pub fn filter_profiles<'a>(profiles: &'a [Profile], spec: &FilterSpec) -> Vec<&'a Profile> {
    let term = spec.search_term();
    let location = spec.location_filter();
    let skill = spec.skill_filter();

    let mut matched: Vec<&Profile> = profiles
        .iter()
        .filter(|profile| {
            term.as_deref()
                .is_none_or(|term| matches_search(profile, term, spec.search_scope))
        })
        .filter(|profile| spec.availability.matches(profile.availability))
        .filter(|profile| matches_open_to(profile, &spec.open_to))
        .filter(|profile| location.is_none_or(|location| profile.location.trim() == location))
        .filter(|profile| {
            skill.is_none_or(|skill| profile.skills.iter().any(|s| s.trim() == skill))
        })
        .collect();

    sort_profiles(&mut matched, spec.sort_by);
    matched
}

fn matches_search(profile: &Profile, term: &str, scope: SearchScope) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(term);
    contains(&profile.name)
        || contains(&profile.role)
        || profile.skills.iter().any(|skill| contains(skill))
        || (scope == SearchScope::WithLocation && contains(&profile.location))
}

// Any selected tag is enough; an empty selection matches everyone.
fn matches_open_to(profile: &Profile, selected: &BTreeSet<OpenTo>) -> bool {
    selected.is_empty() || profile.open_to.iter().any(|option| selected.contains(option))
}

fn sort_profiles(profiles: &mut [&Profile], sort_by: SortOrder) {
    match sort_by {
        SortOrder::Featured => profiles.sort_by_key(|profile| !profile.featured),
        SortOrder::Recent => profiles.sort_by(|a, b| b.last_active.cmp(&a.last_active)),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub locations: Vec<String>,
    pub skills: Vec<String>,
}

/// Distinct, sorted values for the exact-match location and skill pickers.
pub fn facets(profiles: &[Profile]) -> Facets {
    let mut locations = BTreeSet::new();
    let mut skills = BTreeSet::new();
    for profile in profiles {
        let location = profile.location.trim();
        if !location.is_empty() {
            locations.insert(location.to_string());
        }
        for skill in &profile.skills {
            let skill = skill.trim();
            if !skill.is_empty() {
                skills.insert(skill.to_string());
            }
        }
    }
    Facets {
        locations: locations.into_iter().collect(),
        skills: skills.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::models::profile::fixtures;

    fn ids(profiles: &[&Profile]) -> Vec<String> {
        profiles.iter().map(|p| p.id.clone()).collect()
    }

    fn id_set(profiles: &[&Profile]) -> HashSet<String> {
        profiles.iter().map(|p| p.id.clone()).collect()
    }

    fn roster() -> Vec<Profile> {
        let mut ada = fixtures::profile("ada", "Ada Lovelace");
        ada.role = "Analyst".to_string();
        ada.location = "London".to_string();
        ada.skills = vec!["Rust".to_string(), "Mathematics".to_string()];
        ada.open_to = vec![OpenTo::Freelance];
        ada.last_active = fixtures::at(300);

        let mut grace = fixtures::profile("grace", "Grace Hopper");
        grace.role = "Compiler Engineer".to_string();
        grace.location = "Arlington".to_string();
        grace.skills = vec!["Cobol".to_string()];
        grace.open_to = vec![OpenTo::Advising, OpenTo::FullTime];
        grace.availability = Availability::Open;
        grace.featured = true;
        grace.last_active = fixtures::at(100);

        let mut alan = fixtures::profile("alan", "Alan Turing");
        alan.role = "Cryptanalyst".to_string();
        alan.location = "Manchester".to_string();
        alan.skills = vec!["Rust".to_string()];
        alan.open_to = vec![OpenTo::Equity];
        alan.last_active = fixtures::at(200);

        let mut barbara = fixtures::profile("barbara", "Barbara Liskov");
        barbara.role = "Professor".to_string();
        barbara.location = "London".to_string();
        barbara.availability = Availability::Unavailable;
        barbara.featured = true;
        barbara.last_active = fixtures::at(400);

        vec![ada, grace, alan, barbara]
    }

    #[test]
    fn empty_input_yields_empty_result() {
        let spec = FilterSpec::default().with_search("anything");
        assert!(filter_profiles(&[], &spec).is_empty());
        assert!(filter_profiles(&[], &FilterSpec::default()).is_empty());
    }

    #[test]
    fn default_spec_keeps_everyone_featured_first() {
        let profiles = roster();
        let result = filter_profiles(&profiles, &FilterSpec::default());
        assert_eq!(ids(&result), vec!["grace", "barbara", "ada", "alan"]);
    }

    #[test]
    fn featured_sort_is_a_stable_partition() {
        let mut a = fixtures::profile("a", "A");
        let mut b = fixtures::profile("b", "B");
        let mut c = fixtures::profile("c", "C");
        let mut d = fixtures::profile("d", "D");
        a.featured = false;
        b.featured = true;
        c.featured = false;
        d.featured = true;
        let profiles = vec![a, b, c, d];

        let result = filter_profiles(&profiles, &FilterSpec::default());
        assert_eq!(ids(&result), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn recent_sort_orders_by_last_active_descending() {
        let mut first = fixtures::profile("t1", "One");
        let mut second = fixtures::profile("t2", "Two");
        let mut third = fixtures::profile("t3", "Three");
        first.last_active = fixtures::at(1);
        second.last_active = fixtures::at(2);
        third.last_active = fixtures::at(3);
        let profiles = vec![second, first, third];

        let spec = FilterSpec::default().sorted_by(SortOrder::Recent);
        let result = filter_profiles(&profiles, &spec);
        assert_eq!(ids(&result), vec!["t3", "t2", "t1"]);
    }

    #[test]
    fn recent_sort_keeps_input_order_on_ties() {
        let profiles = vec![
            fixtures::profile("x", "X"),
            fixtures::profile("y", "Y"),
            fixtures::profile("z", "Z"),
        ];
        let spec = FilterSpec::default().sorted_by(SortOrder::Recent);
        assert_eq!(ids(&filter_profiles(&profiles, &spec)), vec!["x", "y", "z"]);
    }

    #[test]
    fn search_is_case_insensitive_over_name_role_and_skills() {
        let profiles = roster();

        let by_name = FilterSpec::default().with_search("LOVELACE");
        assert_eq!(ids(&filter_profiles(&profiles, &by_name)), vec!["ada"]);

        let by_role = FilterSpec::default().with_search("compiler");
        assert_eq!(ids(&filter_profiles(&profiles, &by_role)), vec!["grace"]);

        let by_skill = FilterSpec::default()
            .with_search("rus")
            .sorted_by(SortOrder::Recent);
        assert_eq!(ids(&filter_profiles(&profiles, &by_skill)), vec!["ada", "alan"]);
    }

    #[test]
    fn location_is_searched_only_with_extended_scope() {
        let profiles = roster();
        let spec = FilterSpec::default().with_search("london");
        assert!(filter_profiles(&profiles, &spec).is_empty());

        let spec = spec.with_search_scope(SearchScope::WithLocation);
        assert_eq!(
            id_set(&filter_profiles(&profiles, &spec)),
            HashSet::from(["ada".to_string(), "barbara".to_string()])
        );
    }

    #[test]
    fn blank_search_term_matches_everything() {
        let profiles = roster();
        let spec = FilterSpec::default().with_search("   ");
        assert_eq!(filter_profiles(&profiles, &spec).len(), profiles.len());
        assert_eq!(spec.active_filter_count(), 0);
    }

    #[test]
    fn open_to_selection_is_disjunctive() {
        let profiles = roster();
        let spec = FilterSpec::default().with_open_to([OpenTo::Freelance, OpenTo::Equity]);
        let result = filter_profiles(&profiles, &spec);
        assert_eq!(
            id_set(&result),
            HashSet::from(["ada".to_string(), "alan".to_string()])
        );
        assert!(!result.iter().any(|p| p.id == "barbara"), "no tags never matches");
    }

    #[test]
    fn dimensions_compose_conjunctively() {
        let profiles = roster();
        let search = FilterSpec::default().with_search("rust");
        let london = FilterSpec::default().with_location("London");
        let both = FilterSpec::default().with_search("rust").with_location("London");

        let left = id_set(&filter_profiles(&profiles, &search));
        let right = id_set(&filter_profiles(&profiles, &london));
        let combined = id_set(&filter_profiles(&profiles, &both));
        let expected: HashSet<String> = left.intersection(&right).cloned().collect();
        assert_eq!(combined, expected);
        assert_eq!(combined, HashSet::from(["ada".to_string()]));

        let open = FilterSpec::default().with_availability(AvailabilityFilter::Open);
        let advising = FilterSpec::default().with_open_to([OpenTo::Advising]);
        let both = FilterSpec::default()
            .with_availability(AvailabilityFilter::Open)
            .with_open_to([OpenTo::Advising]);
        let expected: HashSet<String> = id_set(&filter_profiles(&profiles, &open))
            .intersection(&id_set(&filter_profiles(&profiles, &advising)))
            .cloned()
            .collect();
        assert_eq!(id_set(&filter_profiles(&profiles, &both)), expected);
    }

    #[test]
    fn exact_filters_ignore_all_sentinel() {
        let profiles = roster();
        let spec = FilterSpec::default().with_location("all").with_skill("ALL");
        assert_eq!(filter_profiles(&profiles, &spec).len(), profiles.len());
        assert_eq!(spec.active_filter_count(), 0);

        let spec = FilterSpec::default().with_skill("Rust");
        assert_eq!(id_set(&filter_profiles(&profiles, &spec)).len(), 2);
        let spec = FilterSpec::default().with_skill("rust");
        assert!(filter_profiles(&profiles, &spec).is_empty(), "skill match is exact");
        let spec = FilterSpec::default().with_location("Atlantis");
        assert!(filter_profiles(&profiles, &spec).is_empty());
    }

    #[test]
    fn availability_filter_beats_featured_placement() {
        let mut ada = fixtures::profile("ada", "Ada Lovelace");
        ada.skills = vec!["Rust".to_string()];
        let mut grace = fixtures::profile("grace", "Grace Hopper");
        grace.skills = vec!["Cobol".to_string()];
        grace.featured = true;
        grace.availability = Availability::Open;
        let profiles = vec![ada, grace];

        let spec = FilterSpec::default().with_availability(AvailabilityFilter::Available);
        let result = filter_profiles(&profiles, &spec);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Ada Lovelace");
    }

    #[test]
    fn filtering_is_idempotent_and_leaves_input_alone() {
        let profiles = roster();
        let snapshot = profiles.clone();
        let spec = FilterSpec::default()
            .with_search("a")
            .sorted_by(SortOrder::Recent);

        let first: Vec<Profile> = filter_profiles(&profiles, &spec).into_iter().cloned().collect();
        let second: Vec<Profile> = filter_profiles(&profiles, &spec).into_iter().cloned().collect();
        assert_eq!(first, second);
        assert_eq!(profiles, snapshot);
    }

    #[test]
    fn missing_arrays_never_fail_a_predicate() {
        let bare = fixtures::profile("bare", "Bare");
        let profiles = vec![bare];
        let spec = FilterSpec::default()
            .with_search("rust")
            .with_open_to([OpenTo::Equity])
            .with_skill("Rust");
        assert!(filter_profiles(&profiles, &spec).is_empty());
    }

    #[test]
    fn toggling_and_counting_filters() {
        let mut spec = FilterSpec::default().with_search("ada");
        spec.toggle_open_to(OpenTo::Advising);
        spec.toggle_open_to(OpenTo::Equity);
        assert_eq!(spec.open_to.len(), 2);
        spec.toggle_open_to(OpenTo::Advising);
        assert_eq!(spec.open_to, BTreeSet::from([OpenTo::Equity]));

        spec.availability = AvailabilityFilter::Open;
        spec.location = Some("London".to_string());
        assert_eq!(spec.active_filter_count(), 4);
        assert_eq!(FilterSpec::cleared().active_filter_count(), 0);
        assert_eq!(FilterSpec::cleared().sort_by, SortOrder::Featured);
    }

    #[test]
    fn facets_are_sorted_and_distinct() {
        let profiles = roster();
        let facets = facets(&profiles);
        assert_eq!(facets.locations, vec!["Arlington", "London", "Manchester"]);
        assert_eq!(facets.skills, vec!["Cobol", "Mathematics", "Rust"]);
    }

    #[test]
    fn every_facet_value_selects_its_profiles() {
        let mut padded = fixtures::profile("padded", "Padded Profile");
        padded.location = "London ".to_string();
        padded.skills = vec![" Rust".to_string()];
        let mut profiles = roster();
        profiles.push(padded);

        let facets = facets(&profiles);
        assert_eq!(facets.locations, vec!["Arlington", "London", "Manchester"]);
        for location in &facets.locations {
            let spec = FilterSpec::default().with_location(location.as_str());
            let matched = filter_profiles(&profiles, &spec);
            assert!(!matched.is_empty(), "no profile for location {location}");
            assert!(matched.iter().all(|p| p.location.trim() == location));
        }
        for skill in &facets.skills {
            let spec = FilterSpec::default().with_skill(skill.as_str());
            assert!(!filter_profiles(&profiles, &spec).is_empty(), "no profile for skill {skill}");
        }

        let london = FilterSpec::default().with_location("London");
        assert!(ids(&filter_profiles(&profiles, &london)).contains(&"padded".to_string()));
        let rust = FilterSpec::default().with_skill("Rust");
        assert!(ids(&filter_profiles(&profiles, &rust)).contains(&"padded".to_string()));
    }

    #[test]
    fn padded_search_term_still_matches() {
        let profiles = roster();
        let spec = FilterSpec::default().with_search("ace ");
        assert_eq!(ids(&filter_profiles(&profiles, &spec)), vec!["grace", "ada"]);

        let spec = FilterSpec::default().with_search("  lovelace");
        assert_eq!(ids(&filter_profiles(&profiles, &spec)), vec!["ada"]);
    }

    #[test]
    fn spec_deserializes_with_defaults() {
        let spec: FilterSpec = serde_json::from_str(
            r#"{"availability":"open","open_to":["freelance"],"sort_by":"recent"}"#,
        )
        .expect("spec decodes");
        assert_eq!(spec.availability, AvailabilityFilter::Open);
        assert_eq!(spec.sort_by, SortOrder::Recent);
        assert!(spec.search.is_empty());
        assert_eq!(spec.search_scope, SearchScope::NameRoleSkills);
    }
}
