//! Error body shared by every control-plane endpoint.

use serde::{Deserialize, Serialize};

/// Structured error body returned on 4xx responses. Not every endpoint
/// guarantees one, so callers fall back to a synthesized message when the
/// body does not decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub message: String,
}
