//! Database operations for users.

use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::user::{self, Entity as UserEntity};
use crate::error::{AppError, AppResult};
use crate::models::user::{Role, SocialProfile};

/// Fields for a new email/password user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub role: Role,
}

/// Find a user by (normalized) email.
pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> AppResult<Option<user::Model>> {
    let result = UserEntity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;

    Ok(result)
}

/// Find a user by ID.
pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> AppResult<Option<user::Model>> {
    Ok(UserEntity::find_by_id(id).one(db).await?)
}

/// Insert a user registered with email and password.
///
/// Fails with `Conflict` when the email is already taken.
pub async fn insert(db: &DatabaseConnection, new_user: NewUser) -> AppResult<user::Model> {
    if find_by_email(db, &new_user.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let now = Utc::now();
    let model = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(new_user.name),
        email: Set(new_user.email),
        password_hash: Set(Some(new_user.password_hash)),
        phone: Set(new_user.phone),
        role: Set(new_user.role.as_str().to_string()),
        provider: Set(None),
        social_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    model.insert(db).await.map_err(|e| match e.sql_err() {
        // Lost a race with a concurrent registration
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Email already registered".to_string())
        }
        _ => AppError::Database(format!("Failed to insert user: {}", e)),
    })
}

/// Resolve the local user for a social sign-in.
///
/// Looks up by provider social id, then by email. A user found by email who has
/// no provider yet gets this provider linked. Unknown profiles become new
/// `customer` users without a password.
pub async fn find_or_create_social(
    db: &DatabaseConnection,
    profile: &SocialProfile,
) -> AppResult<user::Model> {
    let by_social = UserEntity::find()
        .filter(user::Column::Provider.eq(profile.provider.as_str()))
        .filter(user::Column::SocialId.eq(profile.social_id.as_str()))
        .one(db)
        .await?;

    if let Some(existing) = by_social {
        return Ok(existing);
    }

    if let Some(existing) = find_by_email(db, &profile.email).await? {
        if existing.provider.is_some() {
            return Ok(existing);
        }

        let mut active: user::ActiveModel = existing.into();
        active.provider = Set(Some(profile.provider.as_str().to_string()));
        active.social_id = Set(Some(profile.social_id.clone()));
        active.updated_at = Set(Utc::now());
        let linked = active.update(db).await?;
        return Ok(linked);
    }

    let now = Utc::now();
    let model = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(profile.name.clone()),
        email: Set(profile.email.clone()),
        password_hash: Set(None),
        phone: Set(None),
        role: Set(Role::Customer.as_str().to_string()),
        provider: Set(Some(profile.provider.as_str().to_string())),
        social_id: Set(Some(profile.social_id.clone())),
        created_at: Set(now),
        updated_at: Set(now),
    };

    model
        .insert(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert social user: {}", e)))
}
