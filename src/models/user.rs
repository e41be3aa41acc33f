use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_db(self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

pub fn role_from_db<T: AsRef<str>>(value: T) -> UserRole {
    match value.as_ref() {
        "user" => UserRole::User,
        "admin" => UserRole::Admin,
        other => panic!("Unknown user role: {}", other),
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            avatar_url: user.avatar_url.clone(),
            role: user.role,
        }
    }
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Bearer token plus the authenticated user, returned by register, login
/// and password reset.
#[derive(Serialize, Debug, JsonSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

/// Always-success response for the forgot-password endpoint, to avoid
/// disclosing which addresses have accounts.
#[derive(Serialize, Debug, JsonSchema)]
pub struct ForgotPasswordResponse {
    pub message: String,
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 6))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_db_text() {
        assert!(matches!(role_from_db(UserRole::User.as_db()), UserRole::User));
        assert!(matches!(role_from_db(UserRole::Admin.as_db()), UserRole::Admin));
    }

    #[test]
    #[should_panic(expected = "Unknown user role")]
    fn unknown_role_panics() {
        role_from_db("superuser");
    }

    #[test]
    fn register_request_rejects_short_password() {
        let request = RegisterRequest {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            password: "short".to_string(),
            phone: None,
        };
        assert!(request.validate().is_err());
    }
}
