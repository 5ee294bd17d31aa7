//! User registration and email/password sign-in.

use actix_web::{HttpResponse, web};
use tracing::info;
use validator::Validate;

use crate::auth::{TokenService, password};
use crate::config::Config;
use crate::db::{DbPool, users};
use crate::error::{AppError, AppResult};
use crate::models::user::{
    RegisterRequest, SignInRequest, SignInResponse, User, normalize_email,
};

/// Register a new user.
#[utoipa::path(
    post,
    path = "/api/users/register",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Validation failed", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse),
    )
)]
pub async fn register(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let email = normalize_email(&req.email);
    let password_hash = password::hash(req.password, config.auth.bcrypt_cost).await?;

    let user = users::insert(
        pool.connection(),
        users::NewUser {
            name: req.name,
            email,
            password_hash,
            phone: req.phone.filter(|p| !p.is_empty()),
            role: req.role.unwrap_or_default(),
        },
    )
    .await?;

    info!("Registered user {} ({}) as {}", user.id, user.email, user.role);

    Ok(HttpResponse::Created().json(User::from(user)))
}

/// Sign in with email and password.
#[utoipa::path(
    post,
    path = "/api/users/signin",
    tag = "Users",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = SignInResponse),
        (status = 400, description = "Validation failed", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn signin(
    pool: web::Data<DbPool>,
    tokens: web::Data<TokenService>,
    body: web::Json<SignInRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let email = normalize_email(&req.email);
    let user = users::find_by_email(pool.connection(), &email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    // Users created through a provider have no password to check
    let Some(hash) = user.password_hash.clone() else {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    };
    if !password::verify(req.password, hash).await? {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let user = User::from(user);
    let token = tokens.issue(user.id, &user.email, user.role)?;

    info!("User {} signed in", user.id);

    Ok(HttpResponse::Ok().json(SignInResponse { user, token }))
}

/// Configure user routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/users/register").route(web::post().to(register)))
        .service(web::resource("/users/signin").route(web::post().to(signin)));
}
