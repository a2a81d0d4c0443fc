use crate::config::PublicEndpoint;

/// returns the shareable player URL for a track, as included in the
/// create response
pub fn track_url(conf: &PublicEndpoint, track_id: &str) -> String {
    let url = conf.base_url.trim_end_matches('/');
    format!("{url}/#track={track_id}")
}
