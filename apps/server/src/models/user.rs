//! User models for registration, sign-in and social sign-in.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// User roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Admin,
    Delivery,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
            Self::Delivery => "delivery",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "customer" => Some(Self::Customer),
            "admin" => Some(Self::Admin),
            "delivery" => Some(Self::Delivery),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Social sign-in providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Google,
    Facebook,
}

impl AuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
        }
    }
}

/// User as returned by the API. Never carries the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub provider: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::user::Model> for User {
    fn from(m: crate::entity::user::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            phone: m.phone,
            role: Role::parse(&m.role).unwrap_or_default(),
            provider: m.provider,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Accepts an optional leading `+`, then 7 to 15 digits with spaces, dashes or
/// parentheses between them.
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let mut count = 0;
    for c in digits.chars() {
        match c {
            '0'..='9' => count += 1,
            ' ' | '-' | '(' | ')' => {}
            _ => return Err(invalid_phone()),
        }
    }
    if (7..=15).contains(&count) {
        Ok(())
    } else {
        Err(invalid_phone())
    }
}

fn invalid_phone() -> ValidationError {
    ValidationError::new("phone").with_message(Cow::Borrowed("Valid phone number required"))
}

/// Registration request body.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required and max 255 chars"))]
    pub name: String,
    #[validate(email(message = "Valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 chars"))]
    pub password: String,
    /// Defaults to `customer`
    pub role: Option<Role>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
}

/// Email/password sign-in request body.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignInRequest {
    #[validate(email(message = "Valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Sign-in response: the user and a bearer token.
#[derive(Debug, Serialize, ToSchema)]
pub struct SignInResponse {
    pub user: User,
    pub token: String,
}

/// Profile returned by a social provider after the code exchange.
#[derive(Debug, Clone)]
pub struct SocialProfile {
    pub provider: AuthProvider,
    pub social_id: String,
    pub name: String,
    pub email: String,
}

/// Lower-case and trim an email so lookups and the unique index agree.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
