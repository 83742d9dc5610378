//! Nyoom - preference-driven restaurant and drink suggestions
//!
//! This library holds the suggestion flow behind the Nyoom app: a durable
//! preference store, a location resolver with permission and timeout
//! handling, a places-backed suggestion resolver, and a static fallback
//! catalog. The HTTP layer in [`routes`] is a thin presentation shell over
//! these pieces.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{FallbackCatalog, LocationResolver, ManualLocation, SuggestionOptions, SuggestionResolver};
pub use crate::models::{Coordinate, LocationState, PreferenceSet, ResolutionError, SuggestionCategory, VenueCandidate};
pub use crate::services::PreferenceStore;
