//! Display name to internal identifier tables
//!
//! Preferences are stored as stable internal identifiers. The tables below
//! translate what the user picks on screen into those identifiers; anything
//! not in a table is kept as entered so newer clients can send categories
//! this build does not know about yet.

use crate::models::PreferenceSet;
use std::collections::BTreeSet;

/// Suffix the places provider uses for restaurant category types
pub const RESTAURANT_SUFFIX: &str = "_restaurant";

pub const CUISINES: &[(&str, &str)] = &[
    ("Italian", "italian_restaurant"),
    ("Mexican", "mexican_restaurant"),
    ("Chinese", "chinese_restaurant"),
    ("Indian", "indian_restaurant"),
    ("Japanese", "japanese_restaurant"),
];

pub const ATMOSPHERES: &[(&str, &str)] = &[
    ("Casual", "casual"),
    ("Formal", "formal"),
    ("Outdoor", "outdoor"),
    ("Indoor", "indoor"),
];

pub const DISHES: &[(&str, &str)] = &[
    ("Pizza", "pizza_restaurant"),
    ("Sushi", "sushi_restaurant"),
    ("Burger", "hamburger_restaurant"),
];

fn lookup(table: &[(&str, &str)], name: &str) -> String {
    let trimmed = name.trim();
    table
        .iter()
        .find(|(display, _)| display.eq_ignore_ascii_case(trimmed))
        .map(|(_, internal)| (*internal).to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

fn normalize_all<I, S>(table: &[(&str, &str)], names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| lookup(table, name.as_ref()))
        .filter(|id| !id.is_empty())
        .collect()
}

pub fn normalize_cuisine(name: &str) -> String {
    lookup(CUISINES, name)
}

pub fn normalize_atmosphere(name: &str) -> String {
    lookup(ATMOSPHERES, name)
}

pub fn normalize_dish(name: &str) -> String {
    lookup(DISHES, name)
}

/// Build a preference set from display names
pub fn normalize_preferences<I, S>(cuisines: I, atmospheres: I, dishes: I) -> PreferenceSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    PreferenceSet {
        cuisines: normalize_all(CUISINES, cuisines),
        atmospheres: normalize_all(ATMOSPHERES, atmospheres),
        favorite_dishes: normalize_all(DISHES, dishes),
    }
}

/// Map an internal cuisine identifier to a provider category tag
///
/// Lower-cases, replaces whitespace with underscores and appends the
/// restaurant suffix unless it is already there.
pub fn provider_tag(identifier: &str) -> Option<String> {
    let base = identifier
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");

    if base.is_empty() {
        return None;
    }

    if base.ends_with(RESTAURANT_SUFFIX) {
        Some(base)
    } else {
        Some(format!("{}{}", base, RESTAURANT_SUFFIX))
    }
}
