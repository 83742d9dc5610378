use crate::models::{Coordinate, SuggestionCategory, VenueCandidate};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Picks which catalog entry to show for a given re-roll count
pub trait CandidateSelector: Send + Sync {
    /// Index into `pool`, or `None` when the pool is empty
    fn select(&self, pool: &[VenueCandidate], roll: u32) -> Option<usize>;
}

/// Alternates between the entries in order: roll 0 is the primary, roll 1
/// the alternate, roll 2 the primary again
#[derive(Debug, Clone, Copy, Default)]
pub struct ToggleSelector;

impl CandidateSelector for ToggleSelector {
    fn select(&self, pool: &[VenueCandidate], roll: u32) -> Option<usize> {
        if pool.is_empty() {
            return None;
        }
        Some(roll as usize % pool.len())
    }
}

/// Uniform random pick; the first request (roll 0) still shows the primary
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelector;

impl CandidateSelector for RandomSelector {
    fn select(&self, pool: &[VenueCandidate], roll: u32) -> Option<usize> {
        match (pool.len(), roll) {
            (0, _) => None,
            (_, 0) => Some(0),
            (len, _) => Some(fastrand::usize(..len)),
        }
    }
}

/// Static venues shown when no dynamic suggestion is available
pub struct FallbackCatalog {
    food: Vec<VenueCandidate>,
    drinks: Vec<VenueCandidate>,
    selector: Arc<dyn CandidateSelector>,
}

impl FallbackCatalog {
    pub fn new(selector: Arc<dyn CandidateSelector>) -> Self {
        Self {
            food: vec![
                venue(
                    "Nue",
                    "1519 14th Ave, Seattle, WA 98122",
                    Some(Coordinate::new(47.6147255, -122.3144481)),
                    Some("https://www.google.com/maps/place/Nue/@47.6147255,-122.317023,17z/data=!4m6!3m5!1s0x54906acdfa55ddcf:0xaa8c3f43520ea04d!8m2!3d47.6147255!4d-122.3144481!16s%2Fg%2F11b6ds3khs?entry=ttu"),
                    "restaurant",
                ),
                venue("Dick's Drive-In", "115 Broadway E, Seattle, WA 98102", None, None, "hamburger_restaurant"),
            ],
            drinks: vec![
                venue(
                    "Montana",
                    "1506 E Olive Way, Seattle, WA 98122",
                    Some(Coordinate::new(47.6177032, -122.3252654)),
                    Some("https://www.google.com/maps/place/Montana/@47.6177032,-122.3274541,17z/data=!4m10!1m2!2m1!1sMontana!3m6!1s0x54906acafa5a22eb:0xfff92a473406768b!8m2!3d47.6177032!4d-122.3252654!15sCgdNb250YW5hkgEQYmFydF9zdXBwbHlfcmVzdGF1cmFudPoBJENoZERTVWhOTUc5blMwVkpRMEZuU1VSYWNrbFplbU4wU1VOQlJSQUI?hl=en&entry=ttu"),
                    "bar",
                ),
                venue("Zig Zag Café", "1501 Western Ave Ste 202, Seattle, WA 98101", None, None, "bar"),
            ],
            selector,
        }
    }

    /// Every entry for a category, primary first
    pub fn entries(&self, category: SuggestionCategory) -> &[VenueCandidate] {
        match category {
            SuggestionCategory::Food => &self.food,
            SuggestionCategory::Drinks => &self.drinks,
        }
    }

    pub fn primary(&self, category: SuggestionCategory) -> Option<&VenueCandidate> {
        self.entries(category).first()
    }

    /// Entry to show after `roll` re-rolls
    pub fn reroll(&self, category: SuggestionCategory, roll: u32) -> Option<&VenueCandidate> {
        let pool = self.entries(category);
        self.selector.select(pool, roll).and_then(|i| pool.get(i))
    }
}

impl Default for FallbackCatalog {
    fn default() -> Self {
        Self::new(Arc::new(ToggleSelector))
    }
}

fn venue(
    name: &str,
    address: &str,
    coordinate: Option<Coordinate>,
    maps_url: Option<&str>,
    tag: &str,
) -> VenueCandidate {
    VenueCandidate {
        id: None,
        name: Some(name.to_string()),
        address: Some(address.to_string()),
        coordinate,
        category_tags: BTreeSet::from([tag.to_string()]),
        maps_url: maps_url.map(str::to_string),
    }
}
