use serde::{Deserialize, Serialize};
use validator::Validate;

/// Placeholder returned instead of a stored password
pub const REDACTED_PASSWORD: &str = "********";

/// Where and how to reach the database. Every field is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct ConnectionSettings {
    #[validate(url(message = "Connection URL must be a valid URL"))]
    pub url: String,

    #[validate(length(min = 1, message = "Namespace cannot be empty"))]
    pub namespace: String,

    #[validate(length(min = 1, message = "Database name cannot be empty"))]
    pub database: String,

    #[validate(length(min = 1, message = "Username cannot be empty"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

impl ConnectionSettings {
    /// Copy that is safe to log or return to clients
    pub fn redacted(&self) -> Self {
        Self {
            password: if self.password.is_empty() { String::new() } else { REDACTED_PASSWORD.to_string() },
            ..self.clone()
        }
    }

    /// Keeps `current`'s password when this copy carries the redaction placeholder
    pub fn with_password_from(mut self, current: &ConnectionSettings) -> Self {
        if self.password == REDACTED_PASSWORD {
            self.password = current.password.clone();
        }
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
    }
}

/// Collection names the statistics and admin modules read from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionNames {
    pub players: String,
    pub matches: String,
    pub users: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            players: "RecordedUser".to_string(),
            matches: "Match".to_string(),
            users: "user".to_string(),
        }
    }
}
