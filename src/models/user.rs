//! User accounts: roles, the persisted row, and credential DTOs.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

pub const MIN_PASSWORD_LEN: usize = 4;

const EMAIL_PATTERN: &str = r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Publisher,
    Admin,
}

impl Role {
    /// Staff roles manage the catalog and other users' orders.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Publisher | Role::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Publisher => "publisher",
            Role::Admin => "admin",
        }
    }
}

/// Persisted account row. Credential columns never serialize.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

pub fn valid_email(email: &str) -> bool {
    Regex::new(EMAIL_PATTERN)
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("name is required".to_string()));
        }
        if !valid_email(&self.email) {
            return Err(ApiError::Validation(
                "email must be a valid email".to_string(),
            ));
        }
        validate_password(&self.password)
    }
}

/// Missing fields default to empty so the handler can report both at once.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ApiError::Validation("name is required".to_string()));
            }
        }
        if let Some(email) = &self.email {
            if !valid_email(email) {
                return Err(ApiError::Validation(
                    "email must be a valid email".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_check() {
        assert!(valid_email("diner@example.com"));
        assert!(valid_email("first.last@sub.example.org"));
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing@tld"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email(""));
    }

    fn register(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: None,
        }
    }

    #[test]
    fn register_rejects_bad_fields() {
        assert!(register("Pat", "pat@example.com", "hunter2").validate().is_ok());
        assert!(register("   ", "pat@example.com", "hunter2").validate().is_err());
        assert!(register("Pat", "nope", "hunter2").validate().is_err());
        assert!(register("Pat", "pat@example.com", "abc").validate().is_err());
    }

    #[test]
    fn password_boundary_is_inclusive() {
        assert!(validate_password("abcd").is_ok());
        assert!(validate_password("abc").is_err());
    }

    #[test]
    fn role_parses_from_lowercase_json() {
        let role: Role = serde_json::from_str("\"publisher\"").unwrap();
        assert_eq!(role, Role::Publisher);
        assert!(serde_json::from_str::<Role>("\"chef\"").is_err());
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn staff_check_covers_publisher_and_admin() {
        assert!(!Role::User.is_staff());
        assert!(Role::Publisher.is_staff());
        assert!(Role::Admin.is_staff());
    }

    #[test]
    fn serialized_user_hides_credentials() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Pat".to_string(),
            email: "pat@example.com".to_string(),
            role: Role::User,
            password_hash: "secret-hash".to_string(),
            reset_token_hash: Some("digest".to_string()),
            reset_token_expires_at: Some(Utc::now()),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert!(json.get("resetTokenHash").is_none());
        assert_eq!(json["email"], "pat@example.com");
        assert_eq!(json["role"], "user");
        assert!(json.get("createdAt").is_some());
    }
}
