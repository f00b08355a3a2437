//! HTTP handlers
//!
//! Routes:
//! - GET  /status
//! - GET  /subscribe/{channel}
//! - GET  /subscribe/{channel}/client/{client}
//! - POST /publish
//! - POST /publish/{channel}
//! - POST /publish/{channel}/client/{client}

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::header::{AUTHORIZATION, CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::broker::{Broker, Message, Status};
use crate::transport::sse::event_stream;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub broker: Broker,
    /// Cancelled when the node shuts down; ends every open event stream.
    pub shutdown: CancellationToken,
}

pub fn build_router(state: AppState, cors_enabled: bool) -> Router {
    let router = Router::new()
        .route("/status", get(status))
        .route("/subscribe/:channel", get(subscribe_channel))
        .route("/subscribe/:channel/client/:client", get(subscribe_client))
        .route("/publish", post(publish_all))
        .route("/publish/:channel", post(publish_channel))
        .route("/publish/:channel/client/:client", post(publish_client))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors_enabled {
        router.layer(cors_layer())
    } else {
        router
    }
}

/// Allows any origin and the `Authorization` header on preflight requests.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

async fn status(State(state): State<AppState>) -> Json<Status> {
    Json(state.broker.status())
}

async fn subscribe_channel(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Response {
    let client_id = uuid::Uuid::new_v4().to_string();
    subscribe(state, channel_id, client_id)
}

async fn subscribe_client(
    State(state): State<AppState>,
    Path((channel_id, client_id)): Path<(String, String)>,
) -> Response {
    subscribe(state, channel_id, client_id)
}

/// Registers the client and answers with an event stream that stays open
/// until the subscriber disconnects or the node shuts down.
fn subscribe(state: AppState, channel_id: String, client_id: String) -> Response {
    info!(channel = %channel_id, client = %client_id, "new subscriber connection");

    let subscription = match state.broker.new_client(&channel_id, &client_id) {
        Ok(subscription) => subscription,
        Err(err) => {
            warn!(channel = %channel_id, client = %client_id, error = %err, "failed to create client");
            return err.into_response();
        }
    };

    let stream = event_stream(state.broker, channel_id, subscription, state.shutdown);

    (
        [
            (CONTENT_TYPE, "text/event-stream"),
            (CACHE_CONTROL, "no-cache"),
            (CONNECTION, "keep-alive"),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

async fn publish_all(State(state): State<AppState>, body: Bytes) -> Response {
    publish(state, "", "", &body)
}

async fn publish_channel(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    body: Bytes,
) -> Response {
    publish(state, &channel_id, "", &body)
}

async fn publish_client(
    State(state): State<AppState>,
    Path((channel_id, client_id)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    publish(state, &channel_id, &client_id, &body)
}

fn publish(state: AppState, channel_id: &str, client_id: &str, body: &[u8]) -> Response {
    let msg = match Message::decode(body) {
        Ok(msg) => msg,
        Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    };

    match state.broker.publish(channel_id, client_id, msg) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => {
            warn!(channel = %channel_id, client = %client_id, error = %err, "failed to publish message");
            err.into_response()
        }
    }
}
