//! Pure query pipeline over a catalog snapshot: genre filter, sort,
//! pagination. No IO here, operations hand in the collection they loaded.

use super::genre::Genre;
use super::track::Track;

/// Default page size when the caller supplies no usable limit.
pub const DEFAULT_LIMIT: usize = 50;
/// Hard cap on page size. Requested limits are clamped, never rejected.
pub const MAX_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Most recently created first.
    #[default]
    New,
    /// Most played first.
    Popular,
}

impl SortMode {
    /// Unrecognized or absent input falls back to [`SortMode::New`].
    pub fn parse(s: Option<&str>) -> SortMode {
        match s {
            Some("popular") => SortMode::Popular,
            _ => SortMode::New,
        }
    }
}

/// The bounded page plus the pre-pagination (post-filter) total.
#[derive(Debug)]
pub struct TrackList {
    pub tracks: Vec<Track>,
    pub total: usize,
}

pub fn filter(tracks: Vec<Track>, genre: Option<Genre>) -> Vec<Track> {
    match genre {
        Some(genre) => tracks.into_iter().filter(|t| t.genre == genre).collect(),
        None => tracks,
    }
}

pub fn sort(tracks: &mut [Track], mode: SortMode) {
    match mode {
        SortMode::Popular => tracks.sort_by(|a, b| b.plays.cmp(&a.plays)),
        SortMode::New => tracks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

/// Coerces the caller-supplied limit into a usable page size: absent or
/// unparseable means [`DEFAULT_LIMIT`], negative means an empty page, and
/// anything above [`MAX_LIMIT`] is clamped down.
pub fn effective_limit(requested: Option<i64>) -> usize {
    match requested {
        Some(n) => n.clamp(0, MAX_LIMIT as i64) as usize,
        None => DEFAULT_LIMIT,
    }
}

pub fn run(
    tracks: Vec<Track>,
    genre: Option<Genre>,
    mode: SortMode,
    limit: Option<i64>,
) -> TrackList {
    let mut filtered = filter(tracks, genre);
    sort(&mut filtered, mode);
    let total = filtered.len();
    filtered.truncate(effective_limit(limit));
    TrackList {
        tracks: filtered,
        total,
    }
}
