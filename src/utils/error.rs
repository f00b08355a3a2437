//! The `error` module defines the error type shared by the broker, the
//! relay and the HTTP transport.
//!
//! Local delivery misses and relay failures are represented here too, even
//! though the broker only logs most of them rather than returning them to
//! the publisher.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("failed to add client to channel {channel}, client with id {client} already exists")]
    DuplicateClient { channel: String, client: String },

    #[error("client {client} not found in channel {channel}")]
    ClientNotFound { channel: String, client: String },

    #[error("invalid channel/client identifier combination")]
    InvalidTarget,

    #[error("broker is shutting down")]
    ShuttingDown,

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to perform http request: {0}")]
    RelayTransport(#[from] reqwest::Error),

    #[error("node responded with {status}: {body}")]
    RelayRejected { status: u16, body: String },

    #[error("cannot build relay url for member {member}")]
    RelayUrl { member: String },

    #[error("member {member} does not advertise a valid http port")]
    InvalidMemberMeta { member: String },
}

impl IntoResponse for BrokerError {
    fn into_response(self) -> Response {
        let status = match &self {
            BrokerError::DuplicateClient { .. } => StatusCode::CONFLICT,
            BrokerError::InvalidTarget => StatusCode::BAD_REQUEST,
            BrokerError::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}
