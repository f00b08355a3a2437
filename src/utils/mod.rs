//! The `utils` module holds the pieces shared across the node: the error type
//! and the tracing setup.

pub mod error;
pub mod logging;

pub use error::BrokerError;

#[cfg(test)]
mod tests {
    use super::error::BrokerError;
    use super::logging;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn logging_init_accepts_levels() {
        // Should not panic
        logging::init("info", false);
        logging::init("debug", true);
        logging::init("warning", false);
    }

    #[test]
    fn errors_map_to_status_codes() {
        let duplicate = BrokerError::DuplicateClient {
            channel: "news".into(),
            client: "u1".into(),
        };
        assert_eq!(duplicate.into_response().status(), StatusCode::CONFLICT);
        assert_eq!(
            BrokerError::InvalidTarget.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BrokerError::ShuttingDown.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        let missing = BrokerError::ClientNotFound {
            channel: "news".into(),
            client: "u2".into(),
        };
        assert_eq!(
            missing.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
