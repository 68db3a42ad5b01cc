pub mod auth;
pub mod middleware;
pub mod rest;
pub mod state;

pub use middleware::require_auth;
pub use rest::{ask_handler, documents_handler, history_handler, train_handler};

use axum::http::StatusCode;
use docuchat_core::ports::CoreError;
use tracing::error;

/// The single boundary where core errors become user-visible responses.
///
/// Every handler funnels `CoreError` through here so that no library
/// failure can crash the session; the worst case is a 5xx with a generic
/// message.
pub(crate) fn core_error_response(e: &CoreError) -> (StatusCode, String) {
    let status = match e {
        CoreError::DuplicateUsername => StatusCode::CONFLICT,
        CoreError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        CoreError::UnsupportedFormat(_) | CoreError::Extraction(_) | CoreError::NoIndex => {
            StatusCode::BAD_REQUEST
        }
        CoreError::Upstream(_) => StatusCode::BAD_GATEWAY,
        CoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!("request failed: {:?}", e);
        // Do not leak library internals to the client.
        return (status, "An internal error occurred".to_string());
    }

    (status, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_message() {
        let (status, message) = core_error_response(&CoreError::NoIndex);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, CoreError::NoIndex.to_string());

        let (status, _) = core_error_response(&CoreError::DuplicateUsername);
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = core_error_response(&CoreError::InvalidCredentials);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn server_errors_are_scrubbed() {
        let (status, message) =
            core_error_response(&CoreError::Database("connection refused at 10.0.0.5".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("10.0.0.5"));
    }

    #[test]
    fn upstream_failures_map_to_bad_gateway() {
        let (status, _) = core_error_response(&CoreError::Upstream("rate limited".into()));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
