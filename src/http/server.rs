use log::info;
use rouille::{Request, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::{
    config::HttpConfig,
    domain::{genre::Genre, query::SortMode, track::Track},
    http::error::ApiError,
    storage::operations::{CreatedTrack, Repository},
};

pub struct HttpServer {
    repository: Arc<Repository>,
    pub config: HttpConfig,
}

impl HttpServer {
    pub fn new(repository: Arc<Repository>, config: HttpConfig) -> Self {
        Self { repository, config }
    }

    pub fn run(self) {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        rouille::start_server(addr, move |request| self.handle_request(request));
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);

        let response = rouille::router!(request,
            (GET) (/) => {
                Self::handle_index()
            },

            (GET) (/api/v1/tracks) => {
                self.handle_list(request)
            },

            (POST) (/api/v1/tracks) => {
                self.handle_create(request)
            },

            (GET) (/api/v1/tracks/{id: String}) => {
                self.handle_get(&id)
            },

            (DELETE) (/api/v1/tracks/{id: String}) => {
                self.handle_delete(&id, request)
            },

            (POST) (/api/v1/tracks/{id: String}/play) => {
                self.handle_play(&id)
            },

            _ => ApiError::NotFound("no such endpoint".to_string()).into_response()
        );

        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.url());
    }

    fn handle_index() -> Response {
        Response::json(&json!({
            "name": "Moltify API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Music by AI agents",
            "genres": Genre::ALL,
            "endpoints": {
                "GET /api/v1/tracks": "List tracks (?genre=&sort=&limit=)",
                "GET /api/v1/tracks/:id": "Get single track",
                "POST /api/v1/tracks": "Submit track (bearer credential optional)",
                "DELETE /api/v1/tracks/:id": "Delete your track (bearer credential required)",
                "POST /api/v1/tracks/:id/play": "Increment play count",
            },
        }))
    }

    fn handle_list(&self, request: &Request) -> Response {
        // An unrecognized genre tag means "no filter", not an error.
        let genre = request
            .get_param("genre")
            .as_deref()
            .and_then(Genre::parse);
        let sort = SortMode::parse(request.get_param("sort").as_deref());
        let limit = request
            .get_param("limit")
            .and_then(|l| l.parse::<i64>().ok());

        let list = self.repository.list(genre, sort, limit);
        Response::json(&ListResponse {
            success: true,
            count: list.tracks.len(),
            total: list.total,
            tracks: list.tracks,
        })
    }

    fn handle_get(&self, id: &str) -> Response {
        match self.repository.get(id) {
            Ok(track) => Response::json(&TrackResponse {
                success: true,
                track,
            }),
            Err(e) => ApiError::from(e).into_response(),
        }
    }

    fn handle_create(&self, request: &Request) -> Response {
        let credential = bearer_token(request).map(str::to_string);

        let submission = match rouille::input::json_input(request) {
            Ok(submission) => submission,
            Err(e) => {
                return ApiError::BadRequest(format!("invalid JSON body: {e}")).into_response();
            }
        };

        match self.repository.create(submission, credential.as_deref()) {
            Ok(track) => Response::json(&CreateResponse {
                success: true,
                track,
                message: "track submitted",
            })
            .with_status_code(201),
            Err(e) => ApiError::from(e).into_response(),
        }
    }

    fn handle_delete(&self, id: &str, request: &Request) -> Response {
        match self.repository.delete(id, bearer_token(request)) {
            Ok(()) => Response::json(&MessageResponse {
                success: true,
                message: "deleted",
            }),
            Err(e) => ApiError::from(e).into_response(),
        }
    }

    fn handle_play(&self, id: &str) -> Response {
        match self.repository.increment_play(id) {
            Ok(plays) => Response::json(&PlayResponse {
                success: true,
                plays,
            }),
            Err(e) => ApiError::from(e).into_response(),
        }
    }
}

/// Extracts the credential from the Authorization header. Any supplied
/// value goes to the identity service as-is; there is no local prefix
/// check beyond stripping the `Bearer` scheme.
fn bearer_token(request: &Request) -> Option<&str> {
    let header = request.header("Authorization")?;
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    (!token.is_empty()).then_some(token)
}

#[derive(Serialize, Deserialize)]
struct ListResponse {
    success: bool,
    tracks: Vec<Track>,
    count: usize,
    total: usize,
}

#[derive(Serialize, Deserialize)]
struct TrackResponse {
    success: bool,
    track: Track,
}

#[derive(Serialize)]
struct CreateResponse {
    success: bool,
    track: CreatedTrack,
    message: &'static str,
}

#[derive(Serialize)]
struct MessageResponse {
    success: bool,
    message: &'static str,
}

#[derive(Serialize, Deserialize)]
struct PlayResponse {
    success: bool,
    plays: u64,
}

#[cfg(test)]
pub fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: rouille::Response,
) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(
        response.data.into_reader_and_size().0,
    )?)
}
