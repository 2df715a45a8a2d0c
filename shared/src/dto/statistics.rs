use serde::{Deserialize, Serialize};

/// A dashboard payload that may have been replaced by its zeroed default.
///
/// When the data source fails the endpoint still answers 200 with default
/// numbers and puts the reason in `warning`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Degraded<T> {
    #[serde(flatten)]
    pub data: T,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl<T> Degraded<T> {
    pub fn complete(data: T) -> Self {
        Self { data, warning: None }
    }

    pub fn fallback(data: T, warning: impl Into<String>) -> Self {
        Self { data, warning: Some(warning.into()) }
    }

    pub fn is_degraded(&self) -> bool {
        self.warning.is_some()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivePlayersResponse {
    pub active_players: u64,
}
