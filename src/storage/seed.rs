//! The hand-authored starter catalog, embedded at compile time.
//!
//! Served whenever the durable document is missing or unreadable, and
//! written out on first start.

use crate::domain::track::Track;

const SEED_JSON: &str = include_str!("../../assets/seed_catalog.json");

pub fn seed_catalog() -> Vec<Track> {
    serde_json::from_str(SEED_JSON).expect("embedded seed catalog is valid JSON")
}
