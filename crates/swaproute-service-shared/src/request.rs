//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};

use crate::ProblemDetails;

/// Longest token id accepted from clients.
pub const MAX_TOKEN_ID_LEN: usize = 128;

/// Validation trait for request types.
///
/// Implementations should validate all fields and return a `ProblemDetails`
/// error for invalid input.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ProblemDetails`.
    ///
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Request for the best route between two tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Source token id.
    pub from: String,

    /// Target token id.
    pub to: String,
}

impl RouteRequest {
    /// Convert into the library request, trimming surrounding whitespace.
    pub fn to_lib(&self) -> swaproute_lib::RouteRequest {
        swaproute_lib::RouteRequest::new(self.from.trim(), self.to.trim())
    }
}

impl Validate for RouteRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        validate_token_field("from", &self.from, request_id)?;
        validate_token_field("to", &self.to, request_id)
    }
}

/// Path parameters for a single-token lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLookup {
    /// Token id to look up.
    pub id: String,
}

impl Validate for TokenLookup {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        validate_token_field("id", &self.id, request_id)
    }
}

fn validate_token_field(
    field: &str,
    value: &str,
    request_id: &str,
) -> Result<(), Box<ProblemDetails>> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Box::new(ProblemDetails::bad_request(
            format!("The '{}' field is required and cannot be empty", field),
            request_id,
        )));
    }

    if value.len() > MAX_TOKEN_ID_LEN {
        return Err(Box::new(ProblemDetails::bad_request(
            format!(
                "The '{}' field must be at most {} characters",
                field, MAX_TOKEN_ID_LEN
            ),
            request_id,
        )));
    }

    Ok(())
}
