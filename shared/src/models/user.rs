use serde::{Deserialize, Serialize};
use serde_json::Value;
use chrono::{DateTime, Utc};
use crate::error::{Result, SharedError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Moderator,
    Admin,
}

/// Dashboard user account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub id: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub role: UserRole,

    #[serde(default = "default_active")]
    pub active: bool,

    /// Argon2 hash; never sent back to API clients
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl UserRecord {
    pub fn from_row(row: &Value) -> Result<Self> {
        let id = row
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| SharedError::MalformedRecord("user row has no id".to_string()))?;

        serde_json::from_value(row.clone())
            .map_err(|e| SharedError::MalformedRecord(format!("user {}: {}", id, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_password_hash_is_not_serialized() {
        let row = json!({
            "id": "user:1",
            "username": "admin",
            "email": "admin@example.com",
            "role": "admin",
            "password": "$argon2id$v=19$..."
        });
        let user = UserRecord::from_row(&row).unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert!(user.password.is_some());

        let out = serde_json::to_value(&user).unwrap();
        assert!(out.get("password").is_none());
    }

    #[test]
    fn test_defaults() {
        let user = UserRecord::from_row(&json!({ "id": "user:2" })).unwrap();
        assert_eq!(user.role, UserRole::User);
        assert!(user.active);
    }
}
