//! Validation of untrusted track submissions.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::genre::Genre;
use super::track::Track;

pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 500;
pub const MAX_CODE_CHARS: usize = 50_000;
pub const MIN_DURATION_SECS: i64 = 5;
pub const MAX_DURATION_SECS: i64 = 300;

/// Tokens that name API surface for escaping the player's sandboxed
/// execution context: network access, DOM/global-object access, dynamic
/// evaluation and dynamic module loading.
///
/// The scan is a plain substring test in this order; the first hit is
/// reported. It screens known-dangerous names textually and can be
/// defeated by obfuscation, so it is a heuristic, not a security
/// boundary.
pub const CODE_DENYLIST: &[&str] = &[
    "fetch(",
    "XMLHttpRequest",
    "WebSocket",
    "document.",
    "window.location",
    "localStorage",
    "eval(",
    "Function(",
    "import(",
    "require(",
];

/// Raw submission payload as received from the caller. Every field is
/// optional here so the validator, not the deserializer, decides what is
/// missing and in which order to report it.
#[derive(Debug, Default, Deserialize)]
pub struct TrackSubmission {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub duration: Option<i64>,
    pub code: Option<String>,
    pub wallet: Option<String>,
    /// Display-name fallback for anonymous submissions. Ignored when the
    /// submitter is authenticated.
    pub artist: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("title required (1-{MAX_TITLE_CHARS} chars)")]
    Title,
    #[error("genre required, valid genres: {0}")]
    Genre(String),
    #[error("duration required ({MIN_DURATION_SECS}-{MAX_DURATION_SECS} seconds)")]
    Duration,
    #[error("code required (max {MAX_CODE_CHARS} chars)")]
    Code,
    #[error("code contains disallowed token: {0}")]
    DisallowedCode(&'static str),
}

/// A submission that passed all checks, with normalized fields.
#[derive(Debug)]
pub struct ValidSubmission {
    pub title: String,
    pub description: Option<String>,
    pub genre: Genre,
    pub duration: u32,
    pub code: String,
    pub wallet: Option<String>,
    pub artist_fallback: Option<String>,
}

impl TrackSubmission {
    /// Runs the ordered admissibility checks, short-circuiting on the
    /// first failure, and normalizes the surviving fields.
    pub fn validate(self) -> Result<ValidSubmission, SubmissionError> {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && t.chars().count() <= MAX_TITLE_CHARS)
            .ok_or(SubmissionError::Title)?
            .to_string();

        let genre = self
            .genre
            .as_deref()
            .and_then(Genre::parse)
            .ok_or_else(|| SubmissionError::Genre(Genre::valid_list()))?;

        let duration = self
            .duration
            .filter(|d| (MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(d))
            .ok_or(SubmissionError::Duration)? as u32;

        let code = self
            .code
            .filter(|c| !c.is_empty() && c.chars().count() <= MAX_CODE_CHARS)
            .ok_or(SubmissionError::Code)?;

        scan_code(&code)?;

        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| d.chars().take(MAX_DESCRIPTION_CHARS).collect());

        Ok(ValidSubmission {
            title,
            description,
            genre,
            duration,
            code,
            wallet: self.wallet,
            artist_fallback: self.artist,
        })
    }
}

fn scan_code(code: &str) -> Result<(), SubmissionError> {
    for &token in CODE_DENYLIST {
        if code.contains(token) {
            return Err(SubmissionError::DisallowedCode(token));
        }
    }
    Ok(())
}

impl ValidSubmission {
    /// Assembles the persistable record. The caller supplies the fresh
    /// unique id (uniqueness is the repository's invariant) and the
    /// submitter's resolved display name and agent id, if any.
    pub fn into_track(
        self,
        id: String,
        artist: String,
        artist_id: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Track {
        Track {
            id,
            title: self.title,
            artist,
            artist_id,
            description: self.description,
            genre: self.genre,
            duration: self.duration,
            code: self.code,
            wallet: self.wallet,
            created_at,
            plays: 0,
        }
    }
}
