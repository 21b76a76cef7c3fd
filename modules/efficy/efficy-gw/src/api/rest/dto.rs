//! REST DTOs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self { status: "UP" }
    }
}

/// `{"error": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Query of `GET /me/demandes`. Kept raw so that garbage falls back to the default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DemandesQuery {
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}
