use serde::{Deserialize, Serialize};

/// Outcome of testing connection settings against the database
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionTestResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ConnectionTestResponse {
    pub fn connected(version: String) -> Self {
        Self {
            success: true,
            message: "Connection successful".to_string(),
            version: Some(version),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self { success: false, message: reason.into(), version: None }
    }
}
