use crate::rooms::SharedRooms;
use crate::ws::ConnectionRegistry;

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Active WebSocket connections: connection id -> outbound sender
    pub connections: ConnectionRegistry,
    /// Presence, room membership, and code snapshots behind a single lock
    pub rooms: SharedRooms,
    /// Outbound HTTP client for the judge service (request timeout baked in)
    pub http: reqwest::Client,
    /// Base URL of the judge service
    pub judge_url: String,
    /// API key sent to the judge service
    pub judge_api_key: String,
    /// Origins allowed to call the HTTP API (empty = any)
    pub allowed_origins: Vec<String>,
}
