use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::dto::player::HANDLE_REGEX;
use crate::models::user::UserRole;

/// Request to create a dashboard user. The password is hashed before it is stored.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50), regex = "HANDLE_REGEX")]
    pub username: String,

    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[serde(default)]
    pub role: UserRole,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial user update. An absent or empty password keeps the current one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, max = 50), regex = "HANDLE_REGEX")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl UpdateUserRequest {
    /// The new password, if one was actually supplied
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_user_defaults() {
        let request: CreateUserRequest = serde_json::from_value(json!({
            "username": "moderator1",
            "name": "Mo",
            "email": "mo@example.com",
            "password": "long-enough"
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.role, UserRole::User);
        assert!(request.active);
    }

    #[test]
    fn test_create_user_rejects_short_password_and_bad_email() {
        let request: CreateUserRequest = serde_json::from_value(json!({
            "username": "mo",
            "name": "Mo",
            "email": "not-an-email",
            "password": "short",
            "role": "moderator"
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_empty_password_is_ignored() {
        let update = UpdateUserRequest { password: Some(String::new()), ..Default::default() };
        assert_eq!(update.new_password(), None);

        let update = UpdateUserRequest { password: Some("n3w-passw0rd".into()), ..Default::default() };
        assert_eq!(update.new_password(), Some("n3w-passw0rd"));
    }
}
