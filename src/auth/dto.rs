use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::error::AuthError;

/// Request body for `POST /signup`. Fields arrive optional so that missing
/// and empty values fail the same way, once, at the handler boundary.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Validated signup input: all fields present, email normalized.
#[derive(Debug)]
pub struct SignupInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Validated login input.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, AuthError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AuthError::MissingField(field)),
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl SignupRequest {
    pub fn validate(self) -> Result<SignupInput, AuthError> {
        let username = required(self.username, "username")?;
        let email = required(self.email, "email")?;
        let password = required(self.password, "password")?;
        Ok(SignupInput {
            username: username.trim().to_string(),
            email: normalize_email(&email),
            password,
        })
    }
}

impl LoginRequest {
    pub fn validate(self) -> Result<LoginInput, AuthError> {
        let email = required(self.email, "email")?;
        let password = required(self.password, "password")?;
        Ok(LoginInput {
            email: normalize_email(&email),
            password,
        })
    }
}

/// `{message}` body used by signup success and every error response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub username: String,
}

/// Public part of the user returned to the client. Never the email, never
/// the password hash.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_missing_username_is_rejected() {
        let req = SignupRequest {
            username: None,
            email: Some("a@b.com".into()),
            password: Some("hunter22".into()),
        };
        assert!(matches!(
            req.validate().unwrap_err(),
            AuthError::MissingField("username")
        ));
    }

    #[test]
    fn empty_fields_count_as_missing() {
        let req = LoginRequest {
            email: Some("   ".into()),
            password: Some("pw".into()),
        };
        assert!(matches!(
            req.validate().unwrap_err(),
            AuthError::MissingField("email")
        ));
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        let input = SignupRequest {
            username: Some("Asha".into()),
            email: Some("  Asha@Example.COM ".into()),
            password: Some("hunter22".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(input.email, "asha@example.com");
        assert_eq!(input.username, "Asha");
    }

    #[test]
    fn login_response_uses_the_wire_field_names() {
        let body = LoginResponse {
            token: "jwt".into(),
            user_id: Uuid::new_v4(),
            username: "asha".into(),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"userId\""));
        assert!(json.contains("\"username\":\"asha\""));
    }
}
