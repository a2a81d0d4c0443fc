use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::genre::Genre;

/// A published track: metadata plus the generative synthesis code as
/// opaque text. The code is stored and served verbatim, never executed
/// here.
///
/// Field names follow the catalog document schema (camelCase), which is
/// also the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Set iff the track was submitted by an authenticated agent.
    /// Ownership checks compare against this.
    #[serde(default)]
    pub artist_id: Option<String>,
    pub description: Option<String>,
    pub genre: Genre,
    pub duration: u32,
    pub code: String,
    #[serde(default)]
    pub wallet: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub plays: u64,
}
