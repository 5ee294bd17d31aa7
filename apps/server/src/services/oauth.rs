//! Google and Facebook sign-in.
//!
//! Endpoints:
//! 1. GET /auth/{provider} - Redirect to the provider (with CSRF `state`)
//! 2. GET /auth/{provider}/callback - Verify state, exchange code, fetch the
//!    profile, resolve the local user and redirect to the frontend with a token
//! 3. GET /auth/logout - Redirect to the frontend login page
//!
//! Tokens are stateless, so logout has nothing to revoke server-side.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse, get, web};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::auth::TokenService;
use crate::config::{Config, OAuthClient};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::user::{AuthProvider, Role, SocialProfile, normalize_email};

/// OAuth CSRF state cookie, verified on callback to prevent login CSRF.
const OAUTH_STATE_COOKIE: &str = "catalog_oauth_state";
/// HTTP connect timeout for provider API calls.
const HTTP_CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);
/// HTTP total timeout for provider API calls.
const HTTP_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const FACEBOOK_AUTHORIZE_URL: &str = "https://www.facebook.com/v19.0/dialog/oauth";
const FACEBOOK_TOKEN_URL: &str = "https://graph.facebook.com/v19.0/oauth/access_token";
const FACEBOOK_PROFILE_URL: &str = "https://graph.facebook.com/me";

/// Configure OAuth routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(google_login)
        .service(google_callback)
        .service(facebook_login)
        .service(facebook_callback)
        .service(logout);
}

/// Build an HTTP client with timeouts.
fn build_http_client() -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .timeout(HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| AppError::internal("Failed to build HTTP client for OAuth", e))
}

/// Generate a cryptographically random string.
fn generate_random_hex() -> String {
    let random_bytes: [u8; 32] = rand::random();
    hex::encode(random_bytes)
}

fn provider_label(provider: AuthProvider) -> &'static str {
    match provider {
        AuthProvider::Google => "Google",
        AuthProvider::Facebook => "Facebook",
    }
}

fn provider_client(config: &Config, provider: AuthProvider) -> &OAuthClient {
    match provider {
        AuthProvider::Google => &config.oauth.google,
        AuthProvider::Facebook => &config.oauth.facebook,
    }
}

/// Client id and secret, or `InvalidInput` if the provider is not configured.
fn credentials(config: &Config, provider: AuthProvider) -> AppResult<(&str, &SecretString)> {
    let client = provider_client(config, provider);
    match (&client.client_id, &client.client_secret) {
        (Some(id), Some(secret)) => Ok((id.as_str(), secret)),
        _ => Err(AppError::InvalidInput(format!(
            "{} sign-in is not configured",
            provider_label(provider)
        ))),
    }
}

/// Callback url registered with the provider.
fn callback_url(public_base_url: &str, provider: AuthProvider) -> String {
    format!(
        "{}/api/auth/{}/callback",
        public_base_url.trim_end_matches('/'),
        provider.as_str()
    )
}

/// Provider authorization page url.
fn authorize_url(provider: AuthProvider, client_id: &str, redirect_uri: &str, state: &str) -> String {
    match provider {
        AuthProvider::Google => format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            GOOGLE_AUTHORIZE_URL,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode("openid email profile"),
            urlencoding::encode(state),
        ),
        AuthProvider::Facebook => format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope=email&state={}",
            FACEBOOK_AUTHORIZE_URL,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
        ),
    }
}

/// Frontend url receiving the token after a successful sign-in.
fn dashboard_redirect(frontend_url: &str, token: &str) -> String {
    format!(
        "{}/dashboard?token={}",
        frontend_url.trim_end_matches('/'),
        urlencoding::encode(token)
    )
}

/// `application/x-www-form-urlencoded` body from key/value pairs.
fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn state_cookie(value: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(OAUTH_STATE_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookie
}

fn auth_failed(provider: AuthProvider) -> AppError {
    AppError::Unauthorized(format!("{} authentication failed", provider_label(provider)))
}

// ============================================================================
// Endpoints
// ============================================================================

/// Redirect to Google's consent page.
///
/// GET /api/auth/google
#[get("/auth/google")]
pub async fn google_login(config: web::Data<Config>) -> AppResult<HttpResponse> {
    login(&config, AuthProvider::Google)
}

/// Handle Google OAuth callback.
///
/// GET /api/auth/google/callback?code=...&state=...
#[get("/auth/google/callback")]
pub async fn google_callback(
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
    config: web::Data<Config>,
    pool: web::Data<DbPool>,
    tokens: web::Data<TokenService>,
) -> AppResult<HttpResponse> {
    callback(&req, &query, &config, &pool, &tokens, AuthProvider::Google).await
}

/// Redirect to Facebook's consent page.
///
/// GET /api/auth/facebook
#[get("/auth/facebook")]
pub async fn facebook_login(config: web::Data<Config>) -> AppResult<HttpResponse> {
    login(&config, AuthProvider::Facebook)
}

/// Handle Facebook OAuth callback.
///
/// GET /api/auth/facebook/callback?code=...&state=...
#[get("/auth/facebook/callback")]
pub async fn facebook_callback(
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
    config: web::Data<Config>,
    pool: web::Data<DbPool>,
    tokens: web::Data<TokenService>,
) -> AppResult<HttpResponse> {
    callback(&req, &query, &config, &pool, &tokens, AuthProvider::Facebook).await
}

/// Send the browser back to the frontend login page.
///
/// GET /api/auth/logout
#[get("/auth/logout")]
pub async fn logout(config: web::Data<Config>) -> HttpResponse {
    let login_url = format!("{}/login", config.oauth.frontend_url.trim_end_matches('/'));
    HttpResponse::Found()
        .append_header(("Location", login_url))
        .finish()
}

fn login(config: &Config, provider: AuthProvider) -> AppResult<HttpResponse> {
    let (client_id, _) = credentials(config, provider)?;

    let state = generate_random_hex();
    let redirect_uri = callback_url(&config.oauth.public_base_url, provider);
    let location = authorize_url(provider, client_id, &redirect_uri, &state);

    Ok(HttpResponse::Found()
        .cookie(state_cookie(state, config.environment.is_production()))
        .append_header(("Location", location))
        .finish())
}

async fn callback(
    req: &HttpRequest,
    query: &CallbackQuery,
    config: &Config,
    pool: &DbPool,
    tokens: &TokenService,
    provider: AuthProvider,
) -> AppResult<HttpResponse> {
    let (client_id, client_secret) = credentials(config, provider)?;

    // --- CSRF state verification ---
    let expected_state = req
        .cookie(OAUTH_STATE_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| {
            warn!("OAuth callback: missing state cookie");
            AppError::Unauthorized("OAuth state verification failed".to_string())
        })?;

    let provided_state = query.state.as_deref().unwrap_or("");
    let state_matches: bool = expected_state
        .as_bytes()
        .ct_eq(provided_state.as_bytes())
        .into();
    if provided_state.is_empty() || !state_matches {
        warn!("OAuth callback: state mismatch");
        return Err(AppError::Unauthorized(
            "OAuth state verification failed".to_string(),
        ));
    }

    if let Some(ref err) = query.error {
        warn!("OAuth: {} returned error: {}", provider_label(provider), err);
        return Err(auth_failed(provider));
    }
    let code = query.code.as_deref().filter(|c| !c.is_empty()).ok_or_else(|| {
        warn!("OAuth callback: missing code");
        auth_failed(provider)
    })?;

    let http_client = build_http_client()?;
    let redirect_uri = callback_url(&config.oauth.public_base_url, provider);

    let profile = match provider {
        AuthProvider::Google => {
            fetch_google_profile(&http_client, client_id, client_secret, code, &redirect_uri)
                .await?
        }
        AuthProvider::Facebook => {
            fetch_facebook_profile(&http_client, client_id, client_secret, code, &redirect_uri)
                .await?
        }
    };

    // --- Resolve local user ---
    let user = crate::db::users::find_or_create_social(pool.connection(), &profile).await?;
    let role = Role::parse(&user.role).unwrap_or_default();

    info!(
        "{} sign-in: user='{}' (id={})",
        provider_label(provider),
        user.email,
        user.id
    );

    let token = tokens.issue(user.id, &user.email, role)?;

    // Clear state cookie
    let mut clear_state = state_cookie(String::new(), config.environment.is_production());
    clear_state.make_removal();

    Ok(HttpResponse::Found()
        .cookie(clear_state)
        .append_header((
            "Location",
            dashboard_redirect(&config.oauth.frontend_url, &token),
        ))
        .finish())
}

// ============================================================================
// Provider calls
// ============================================================================

async fn fetch_google_profile(
    http_client: &reqwest::Client,
    client_id: &str,
    client_secret: &SecretString,
    code: &str,
    redirect_uri: &str,
) -> AppResult<SocialProfile> {
    let provider = AuthProvider::Google;

    // --- Exchange code for access token ---
    let body = form_body(&[
        ("code", code),
        ("client_id", client_id),
        ("client_secret", client_secret.expose_secret()),
        ("redirect_uri", redirect_uri),
        ("grant_type", "authorization_code"),
    ]);

    let token_response: TokenResponse = http_client
        .post(GOOGLE_TOKEN_URL)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .header("Accept", "application/json")
        .body(body)
        .send()
        .await
        .map_err(|e| {
            warn!("OAuth: failed to exchange Google code: {}", e);
            auth_failed(provider)
        })?
        .json()
        .await
        .map_err(|e| {
            warn!("OAuth: failed to parse Google token response: {}", e);
            auth_failed(provider)
        })?;

    let access_token = token_response.into_secret(provider)?;

    // --- Fetch user info ---
    let info: GoogleUserInfo = http_client
        .get(GOOGLE_USERINFO_URL)
        .header(
            "Authorization",
            format!("Bearer {}", access_token.expose_secret()),
        )
        .send()
        .await
        .map_err(|e| {
            warn!("OAuth: failed to fetch Google user info: {}", e);
            auth_failed(provider)
        })?
        .json()
        .await
        .map_err(|e| {
            warn!("OAuth: failed to parse Google user info: {}", e);
            auth_failed(provider)
        })?;

    profile_from_parts(provider, info.sub, info.name, info.email)
}

async fn fetch_facebook_profile(
    http_client: &reqwest::Client,
    client_id: &str,
    client_secret: &SecretString,
    code: &str,
    redirect_uri: &str,
) -> AppResult<SocialProfile> {
    let provider = AuthProvider::Facebook;

    // --- Exchange code for access token ---
    let token_url = format!(
        "{}?client_id={}&redirect_uri={}&client_secret={}&code={}",
        FACEBOOK_TOKEN_URL,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(client_secret.expose_secret()),
        urlencoding::encode(code),
    );

    let token_response: TokenResponse = http_client
        .get(token_url)
        .send()
        .await
        .map_err(|e| {
            warn!("OAuth: failed to exchange Facebook code: {}", e);
            auth_failed(provider)
        })?
        .json()
        .await
        .map_err(|e| {
            warn!("OAuth: failed to parse Facebook token response: {}", e);
            auth_failed(provider)
        })?;

    let access_token = token_response.into_secret(provider)?;

    // --- Fetch profile ---
    let profile_url = format!(
        "{}?fields=id,name,email&access_token={}",
        FACEBOOK_PROFILE_URL,
        urlencoding::encode(access_token.expose_secret()),
    );

    let info: FacebookProfile = http_client
        .get(profile_url)
        .send()
        .await
        .map_err(|e| {
            warn!("OAuth: failed to fetch Facebook profile: {}", e);
            auth_failed(provider)
        })?
        .json()
        .await
        .map_err(|e| {
            warn!("OAuth: failed to parse Facebook profile: {}", e);
            auth_failed(provider)
        })?;

    profile_from_parts(provider, info.id, info.name, info.email)
}

/// Build a profile; an account without an email cannot be linked to a user.
fn profile_from_parts(
    provider: AuthProvider,
    social_id: String,
    name: Option<String>,
    email: Option<String>,
) -> AppResult<SocialProfile> {
    let email = email
        .map(|e| normalize_email(&e))
        .filter(|e| !e.is_empty())
        .ok_or_else(|| {
            warn!("OAuth: {} profile has no email", provider_label(provider));
            AppError::Unauthorized(format!(
                "{} account has no email address",
                provider_label(provider)
            ))
        })?;

    let name = name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email.clone());

    Ok(SocialProfile {
        provider,
        social_id,
        name,
        email,
    })
}

// ============================================================================
// Types
// ============================================================================

#[derive(serde::Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<serde_json::Value>,
}

impl TokenResponse {
    fn into_secret(self, provider: AuthProvider) -> AppResult<SecretString> {
        if let Some(err) = self.error {
            warn!("OAuth: {} returned error: {}", provider_label(provider), err);
            return Err(auth_failed(provider));
        }
        self.access_token.map(SecretString::from).ok_or_else(|| {
            warn!("OAuth: no access_token in response");
            auth_failed(provider)
        })
    }
}

#[derive(serde::Deserialize)]
struct GoogleUserInfo {
    sub: String,
    name: Option<String>,
    email: Option<String>,
}

#[derive(serde::Deserialize)]
struct FacebookProfile {
    id: String,
    name: Option<String>,
    email: Option<String>,
}
