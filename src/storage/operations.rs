use log::{info, warn};
use serde::Serialize;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::{
    config::PublicEndpoint,
    domain::{
        genre::Genre,
        query::{self, SortMode, TrackList},
        submission::TrackSubmission,
        track::Track,
    },
    identity::{AgentIdentity, IdentityProvider},
    public_endpoint,
    storage::{error::CatalogError, store::CatalogStore},
};

/// Display name recorded for anonymous submissions with no fallback.
const ANONYMOUS_ARTIST: &str = "anonymous";

/// Main structure implementing the catalog operations.
///
/// Every operation reloads the collection from the store before acting,
/// so the durable document stays the single source of truth. Mutating
/// operations serialize their load-mutate-save sequence through one
/// process-wide lock; reads never take it.
pub struct Repository {
    store: CatalogStore,
    identity: Arc<dyn IdentityProvider>,
    public_endpoint: PublicEndpoint,
    write_lock: Mutex<()>,
}

/// Public projection of a freshly created track. The full record
/// (including the submitted code) is only served by `get`.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedTrack {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub genre: Genre,
    pub url: String,
}

impl Repository {
    pub fn new(
        store: CatalogStore,
        identity: Arc<dyn IdentityProvider>,
        public_endpoint: PublicEndpoint,
    ) -> Self {
        Self {
            store,
            identity,
            public_endpoint,
            write_lock: Mutex::new(()),
        }
    }

    /// Read-only listing: load, filter, sort, paginate. Never persists.
    pub fn list(&self, genre: Option<Genre>, sort: SortMode, limit: Option<i64>) -> TrackList {
        query::run(self.store.load(), genre, sort, limit)
    }

    pub fn get(&self, id: &str) -> Result<Track, CatalogError> {
        self.store
            .load()
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Submits a track. A supplied credential is always resolved through
    /// the identity service; no credential means the anonymous path, which
    /// is permitted for create.
    pub fn create(
        &self,
        submission: TrackSubmission,
        credential: Option<&str>,
    ) -> Result<CreatedTrack, CatalogError> {
        let agent = match credential {
            Some(credential) => Some(self.resolve_credential(credential)?),
            None => None,
        };

        let valid = submission.validate()?;

        let (artist, artist_id) = match agent {
            Some(agent) => (agent.name, Some(agent.id)),
            None => {
                let fallback = valid
                    .artist_fallback
                    .as_deref()
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .unwrap_or(ANONYMOUS_ARTIST)
                    .to_string();
                (fallback, None)
            }
        };

        let _guard = self.write_lock.lock().unwrap();
        let mut tracks = self.store.load();
        let id = fresh_track_id(&tracks);
        let track = valid.into_track(id, artist, artist_id, Utc::now());

        let created = CreatedTrack {
            id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            genre: track.genre,
            url: public_endpoint::track_url(&self.public_endpoint, &track.id),
        };

        tracks.push(track);
        self.store.save(&tracks)?;

        info!("track {} submitted by {}", created.id, created.artist);
        Ok(created)
    }

    /// Removes a track. Requires a credential resolving to the identity
    /// that created the track; anonymous tracks have no owner and cannot
    /// be deleted.
    pub fn delete(&self, id: &str, credential: Option<&str>) -> Result<(), CatalogError> {
        let credential =
            credential.ok_or_else(|| CatalogError::Auth("authentication required".to_string()))?;
        let agent = self.resolve_credential(credential)?;

        let _guard = self.write_lock.lock().unwrap();
        let mut tracks = self.store.load();
        let idx = tracks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        if tracks[idx].artist_id.as_deref() != Some(agent.id.as_str()) {
            return Err(CatalogError::Ownership(format!(
                "track {id} does not belong to you"
            )));
        }

        tracks.remove(idx);
        self.store.save(&tracks)?;

        info!("track {id} deleted by {}", agent.id);
        Ok(())
    }

    /// Best-effort popularity counter; no authentication. Returns the new
    /// play count.
    pub fn increment_play(&self, id: &str) -> Result<u64, CatalogError> {
        let _guard = self.write_lock.lock().unwrap();
        let mut tracks = self.store.load();
        let track = tracks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        track.plays += 1;
        let plays = track.plays;
        self.store.save(&tracks)?;
        Ok(plays)
    }

    fn resolve_credential(&self, credential: &str) -> Result<AgentIdentity, CatalogError> {
        match self.identity.resolve(credential) {
            Ok(Some(agent)) => Ok(agent),
            Ok(None) => Err(CatalogError::Auth("invalid credential".to_string())),
            Err(e) => {
                warn!("identity lookup failed: {e:#}");
                Err(CatalogError::Auth("could not verify credential".to_string()))
            }
        }
    }
}

fn fresh_track_id(tracks: &[Track]) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !tracks.iter().any(|t| t.id == id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogConfig;
    use crate::domain::submission::SubmissionError;
    use crate::identity::StaticIdentities;
    use tempfile::{TempDir, tempdir};

    const CREDENTIAL: &str = "moltbook-key";
    const AGENT_ID: &str = "agent-7";

    fn repository() -> (Repository, TempDir) {
        let dir = tempdir().unwrap();
        let store = CatalogStore::new(&CatalogConfig {
            path: dir.path().join("tracks.json"),
        });
        store.initialize().unwrap();

        let identity = Arc::new(StaticIdentities::single(CREDENTIAL, AGENT_ID, "AZOTH"));
        let repo = Repository::new(
            store,
            identity,
            PublicEndpoint {
                base_url: "https://moltify.example".to_string(),
            },
        );
        (repo, dir)
    }

    fn submission() -> TrackSubmission {
        TrackSubmission {
            title: Some("Cooling Fan Lullaby".to_string()),
            description: None,
            genre: Some("clank".to_string()),
            duration: Some(42),
            code: Some("const hum = new Tone.Oscillator(50, 'sine');".to_string()),
            wallet: None,
            artist: None,
        }
    }

    #[test]
    fn create_then_get_returns_fresh_record() {
        let (repo, _dir) = repository();
        let before: Vec<String> = repo
            .list(None, SortMode::New, Some(1000))
            .tracks
            .into_iter()
            .map(|t| t.id)
            .collect();

        let created = repo.create(submission(), Some(CREDENTIAL)).unwrap();
        assert!(!before.contains(&created.id));
        assert_eq!(
            created.url,
            format!("https://moltify.example/#track={}", created.id)
        );

        let track = repo.get(&created.id).unwrap();
        assert_eq!(track.title, "Cooling Fan Lullaby");
        assert_eq!(track.artist, "AZOTH");
        assert_eq!(track.artist_id.as_deref(), Some(AGENT_ID));
        assert_eq!(track.plays, 0);
    }

    #[test]
    fn anonymous_create_is_permitted() {
        let (repo, _dir) = repository();
        let created = repo
            .create(
                TrackSubmission {
                    artist: Some("  Drifter  ".to_string()),
                    ..submission()
                },
                None,
            )
            .unwrap();
        assert_eq!(created.artist, "Drifter");

        let track = repo.get(&created.id).unwrap();
        assert_eq!(track.artist_id, None);
    }

    #[test]
    fn anonymous_create_without_fallback_name() {
        let (repo, _dir) = repository();
        let created = repo.create(submission(), None).unwrap();
        assert_eq!(created.artist, "anonymous");
    }

    #[test]
    fn unresolvable_credential_fails_auth() {
        let (repo, _dir) = repository();
        let err = repo.create(submission(), Some("wrong-key")).unwrap_err();
        assert!(matches!(err, CatalogError::Auth(_)));
    }

    #[test]
    fn identity_service_failure_fails_auth() {
        let (repo, _dir) = repository();
        let err = repo.create(submission(), Some("boom")).unwrap_err();
        assert!(matches!(err, CatalogError::Auth(_)));
    }

    #[test]
    fn invalid_submission_is_rejected_before_persisting() {
        let (repo, _dir) = repository();
        let total_before = repo.list(None, SortMode::New, None).total;

        let err = repo
            .create(
                TrackSubmission {
                    code: Some("eval('molt')".to_string()),
                    ..submission()
                },
                Some(CREDENTIAL),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Validation(SubmissionError::DisallowedCode("eval("))
        ));

        assert_eq!(repo.list(None, SortMode::New, None).total, total_before);
    }

    #[test]
    fn delete_by_owner_removes_track() {
        let (repo, _dir) = repository();
        let created = repo.create(submission(), Some(CREDENTIAL)).unwrap();

        repo.delete(&created.id, Some(CREDENTIAL)).unwrap();
        assert!(matches!(
            repo.get(&created.id).unwrap_err(),
            CatalogError::NotFound(_)
        ));
    }

    #[test]
    fn delete_by_non_owner_is_ownership_failure() {
        let (repo, dir) = repository();
        let created = repo.create(submission(), Some(CREDENTIAL)).unwrap();

        // Same document, different resolved agent.
        let store = CatalogStore::new(&CatalogConfig {
            path: dir.path().join("tracks.json"),
        });
        let other = Repository::new(
            store,
            Arc::new(StaticIdentities::single("other-key", "agent-8", "RIVAL")),
            PublicEndpoint {
                base_url: "https://moltify.example".to_string(),
            },
        );

        let err = other.delete(&created.id, Some("other-key")).unwrap_err();
        assert!(matches!(err, CatalogError::Ownership(_)));
        assert!(other.get(&created.id).is_ok(), "track must remain intact");
    }

    #[test]
    fn delete_without_credential_is_auth_failure() {
        let (repo, _dir) = repository();
        let created = repo.create(submission(), Some(CREDENTIAL)).unwrap();
        let err = repo.delete(&created.id, None).unwrap_err();
        assert!(matches!(err, CatalogError::Auth(_)));
    }

    #[test]
    fn delete_of_missing_track_is_not_found() {
        let (repo, _dir) = repository();
        let err = repo.delete("nope", Some(CREDENTIAL)).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[test]
    fn anonymous_track_cannot_be_deleted() {
        let (repo, _dir) = repository();
        let created = repo.create(submission(), None).unwrap();
        let err = repo.delete(&created.id, Some(CREDENTIAL)).unwrap_err();
        assert!(matches!(err, CatalogError::Ownership(_)));
    }

    #[test]
    fn sequential_increments_add_exactly_n() {
        let (repo, _dir) = repository();
        let created = repo.create(submission(), Some(CREDENTIAL)).unwrap();

        for expected in 1..=5 {
            assert_eq!(repo.increment_play(&created.id).unwrap(), expected);
        }
        assert_eq!(repo.get(&created.id).unwrap().plays, 5);
    }

    #[test]
    fn increment_of_missing_track_is_not_found() {
        let (repo, _dir) = repository();
        let err = repo.increment_play("nope").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[test]
    fn list_filters_by_genre() {
        let (repo, _dir) = repository();
        let gospel = repo.list(Some(Genre::Gospel), SortMode::New, None);
        assert!(!gospel.tracks.is_empty());
        assert!(gospel.tracks.iter().all(|t| t.genre == Genre::Gospel));
    }

    #[test]
    fn list_popular_orders_by_plays() {
        let (repo, _dir) = repository();
        let some_id = repo.list(None, SortMode::New, None).tracks[3].id.clone();
        repo.increment_play(&some_id).unwrap();
        repo.increment_play(&some_id).unwrap();

        let popular = repo.list(None, SortMode::Popular, None).tracks;
        assert_eq!(popular[0].id, some_id);
        for pair in popular.windows(2) {
            assert!(pair[0].plays >= pair[1].plays);
        }
    }

    #[test]
    fn list_never_persists() {
        let (repo, dir) = repository();
        let path = dir.path().join("tracks.json");
        let before = std::fs::read_to_string(&path).unwrap();

        repo.list(Some(Genre::Prompt), SortMode::Popular, Some(2));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }
}
