use serde::{Deserialize, Serialize};

/// Error payload the relay attaches to a rejected request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
