use std::fmt;

use shared::error::ApiError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Analysis,
    Headline,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analysis => f.write_str("analysis endpoint"),
            Self::Headline => f.write_str("headline endpoint"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RequestFailure {
    #[error("{endpoint} unreachable: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned HTTP {status}{}", detail_suffix(.detail))]
    Status {
        endpoint: Endpoint,
        status: u16,
        detail: Option<ApiError>,
    },
    #[error("invalid {endpoint} payload: {reason}")]
    InvalidPayload { endpoint: Endpoint, reason: String },
    #[error("{endpoint} is not configured")]
    Unavailable { endpoint: Endpoint },
    #[error("{endpoint} call ended without a response")]
    Crashed { endpoint: Endpoint },
}

fn detail_suffix(detail: &Option<ApiError>) -> String {
    detail
        .as_ref()
        .map(|detail| format!(" ({detail})"))
        .unwrap_or_default()
}

impl RequestFailure {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::InvalidPayload { endpoint, .. }
            | Self::Unavailable { endpoint }
            | Self::Crashed { endpoint } => *endpoint,
        }
    }
}

#[cfg(test)]
mod tests {
    use shared::error::ErrorCode;

    use super::*;

    #[test]
    fn status_failure_mentions_error_body_when_present() {
        let err = RequestFailure::Status {
            endpoint: Endpoint::Analysis,
            status: 503,
            detail: Some(ApiError::new(ErrorCode::Unavailable, "model warming up")),
        };
        let text = err.to_string();
        assert!(text.contains("analysis endpoint returned HTTP 503"));
        assert!(text.contains("model warming up"));
    }

    #[test]
    fn status_failure_without_body_is_terse() {
        let err = RequestFailure::Status {
            endpoint: Endpoint::Headline,
            status: 500,
            detail: None,
        };
        assert_eq!(err.to_string(), "headline endpoint returned HTTP 500");
        assert_eq!(err.endpoint(), Endpoint::Headline);
    }
}
