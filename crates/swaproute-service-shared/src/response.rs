//! Envelope for successful JSON responses.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Successful payload, optionally tagged with the snapshot version it was
/// computed against so clients can tell which refresh an answer reflects.
///
/// The payload's fields are flattened into the top-level object.
///
/// ```
/// use serde::Serialize;
/// use swaproute_service_shared::ServiceResponse;
///
/// #[derive(Serialize)]
/// struct Tokens {
///     tokens: Vec<String>,
/// }
///
/// let response = ServiceResponse::at_version(Tokens { tokens: vec!["bitcoin".into()] }, 12);
/// let json = serde_json::to_value(&response).unwrap();
/// assert_eq!(json["version"], 12);
/// assert_eq!(json["tokens"][0], "bitcoin");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,

    #[serde(flatten)]
    pub data: T,
}

impl<T> ServiceResponse<T> {
    /// A payload that is not tied to a snapshot, or already carries its own
    /// `version` field.
    pub fn new(data: T) -> Self {
        Self {
            version: None,
            data,
        }
    }

    pub fn at_version(data: T, version: u64) -> Self {
        Self {
            version: Some(version),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
