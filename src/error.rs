use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// User-facing failures. None of these should crash the process; they are
/// reported at the point of the failing action.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("no boundary file configured for region '{0}'")]
    UnknownRegion(String),
    #[error("failed to load boundary data for region '{region}': {reason}")]
    Fetch { region: String, reason: String },
    #[error("no city selected in any region")]
    NothingSelected,
}

impl MapError {
    pub fn fetch(region: &str, err: impl std::fmt::Display) -> Self {
        MapError::Fetch {
            region: region.to_string(),
            reason: err.to_string(),
        }
    }
}

impl IntoResponse for MapError {
    fn into_response(self) -> Response {
        let status = match &self {
            MapError::UnknownRegion(_) => StatusCode::NOT_FOUND,
            MapError::Fetch { .. } => StatusCode::BAD_GATEWAY,
            MapError::NothingSelected => StatusCode::UNPROCESSABLE_ENTITY,
        };
        (status, self.to_string()).into_response()
    }
}
