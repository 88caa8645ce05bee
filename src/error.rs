use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Everything that can go wrong between the feed and the rendered page
#[derive(Debug, Error)]
pub enum QuakeMapError {
    #[error("failed to fetch earthquake feed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("earthquake feed is not a valid feature collection: {0}")]
    MalformedFeed(#[from] serde_json::Error),

    #[error("feature #{index} ({}) is invalid: {reason}", .id.as_deref().unwrap_or("no id"))]
    InvalidRecord {
        index: usize,
        id: Option<String>,
        reason: String,
    },

    #[error("failed to render map page: {0}")]
    Template(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl QuakeMapError {
    fn code(&self) -> &'static str {
        match self {
            QuakeMapError::Fetch(_) => "FEED_UNREACHABLE",
            QuakeMapError::MalformedFeed(_) => "MALFORMED_FEED",
            QuakeMapError::InvalidRecord { .. } => "INVALID_RECORD",
            QuakeMapError::Template(_) => "TEMPLATE_ERROR",
            QuakeMapError::Io(_) => "IO_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            QuakeMapError::Fetch(_)
            | QuakeMapError::MalformedFeed(_)
            | QuakeMapError::InvalidRecord { .. } => StatusCode::BAD_GATEWAY,
            QuakeMapError::Template(_) | QuakeMapError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for QuakeMapError {
    fn into_response(self) -> Response {
        tracing::error!("request failed: {}", self);

        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_record_message_names_index_and_id() {
        let err = QuakeMapError::InvalidRecord {
            index: 3,
            id: Some("us7000abcd".to_string()),
            reason: "missing magnitude".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "feature #3 (us7000abcd) is invalid: missing magnitude"
        );

        let anonymous = QuakeMapError::InvalidRecord {
            index: 0,
            id: None,
            reason: "missing time".to_string(),
        };
        assert_eq!(anonymous.to_string(), "feature #0 (no id) is invalid: missing time");
    }

    #[test]
    fn feed_errors_map_to_bad_gateway() {
        let err: QuakeMapError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);

        let err = QuakeMapError::Template("missing asset".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
