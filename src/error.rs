use thiserror::Error;

/// Failure talking to the SportsDataIO REST API.
///
/// The HTTP status is kept as data so callers can tell "this key is not
/// entitled" (401) apart from everything else without string matching.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized (HTTP 401) for {path}")]
    Unauthorized { path: String },

    #[error("HTTP {status} for {path}")]
    Status { status: u16, path: String },

    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),

    #[error("{sport} does not support {what}")]
    Unsupported { sport: &'static str, what: &'static str },
}

impl ApiError {
    /// HTTP status code carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Build the error for a non-success status code.
    pub fn from_status(status: u16, path: impl Into<String>) -> Self {
        let path = path.into();
        if status == 401 {
            ApiError::Unauthorized { path }
        } else {
            ApiError::Status { status, path }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_401_is_unauthorized() {
        let err = ApiError::from_status(401, "/v3/nba/scores/JSON/GamesByDate/2025-FEB-20");
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(401));
        assert!(matches!(err, ApiError::Unauthorized { .. }));
    }

    #[test]
    fn test_other_status_is_not_unauthorized() {
        let err = ApiError::from_status(503, "/v4/soccer/scores/JSON/Competitions");
        assert!(!err.is_unauthorized());
        assert_eq!(err.status(), Some(503));
        assert_eq!(
            err.to_string(),
            "HTTP 503 for /v4/soccer/scores/JSON/Competitions"
        );
    }

    #[test]
    fn test_unsupported_has_no_status() {
        let err = ApiError::Unsupported { sport: "golf", what: "date schedules" };
        assert_eq!(err.status(), None);
    }
}
