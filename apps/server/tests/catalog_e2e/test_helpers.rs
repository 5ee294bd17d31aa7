//! Shared test helpers for catalog E2E tests.

use actix_web::{App, dev::ServiceResponse, test, web};
use catalog_admin_lib::api;
use catalog_admin_lib::auth::{Role, TokenService};
use catalog_admin_lib::config::Config;
use catalog_admin_lib::db::DbPool;
use catalog_admin_lib::services::UploadStore;
use sea_orm::ConnectionTrait;
use secrecy::SecretString;
use serde_json::Value;
use tempfile::TempDir;
use uuid::Uuid;

/// Bytes that are accepted as an image upload; content is never decoded.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png";

const BOUNDARY: &str = "catalog-e2e-boundary";

/// Everything one test needs: database, uploads directory and token issuer.
pub struct TestEnv {
    pub pool: DbPool,
    pub config: Config,
    pub store: UploadStore,
    pub tokens: TokenService,
    _dir: TempDir,
}

impl TestEnv {
    /// Fresh SQLite database and uploads directory under a temp dir.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let url = format!("sqlite://{}/test.db?mode=rwc", dir.path().display());

        let pool = DbPool::connect(&url, 1, 1)
            .await
            .expect("Failed to open SQLite database");
        pool.run_migrations()
            .await
            .expect("Failed to run migrations");

        let mut config = Config::default();
        config.uploads.dir = dir.path().join("uploads");
        config.auth.bcrypt_cost = 4;

        let store = UploadStore::from_config(&config);
        store
            .ensure_dir()
            .await
            .expect("Failed to create uploads dir");

        let tokens = TokenService::new(SecretString::from("catalog-e2e-secret"), 3600);

        Self {
            pool,
            config,
            store,
            tokens,
            _dir: dir,
        }
    }

    pub fn admin_token(&self) -> String {
        self.token_for(Role::Admin)
    }

    pub fn customer_token(&self) -> String {
        self.token_for(Role::Customer)
    }

    fn token_for(&self, role: Role) -> String {
        self.tokens
            .issue(Uuid::new_v4(), &format!("{}@example.com", role), role)
            .expect("Failed to issue token")
    }

    /// Names of the files currently in the product uploads directory, sorted.
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.store.dir())
            .expect("Failed to read uploads dir")
            .map(|entry| {
                entry
                    .expect("Failed to read dir entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }

    /// Run raw SQL against the test database.
    pub async fn exec(&self, sql: &str) {
        self.pool
            .connection()
            .execute_unprepared(sql)
            .await
            .expect("Failed to execute SQL");
    }
}

/// Build the app the same way the server binary does.
pub async fn create_test_app(
    env: &TestEnv,
) -> impl actix_web::dev::Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
{
    test::init_service(
        App::new()
            .app_data(web::Data::new(env.pool.clone()))
            .app_data(web::Data::new(env.store.clone()))
            .app_data(web::Data::new(env.tokens.clone()))
            .app_data(web::Data::new(env.config.clone()))
            .app_data(api::json_config())
            .app_data(api::path_config())
            .app_data(api::query_config())
            .service(web::scope("/api").configure(api::configure_routes)),
    )
    .await
}

/// One multipart form part.
pub enum Part<'a> {
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

impl<'a> Part<'a> {
    /// A PNG under the `images` field.
    pub fn image(filename: &'a str) -> Self {
        Part::File {
            name: "images",
            filename,
            content_type: "image/png",
            data: PNG_BYTES,
        }
    }

    pub fn text(name: &'a str, value: &'a str) -> Self {
        Part::Text { name, value }
    }
}

/// Encode `parts` as a multipart body. Returns the content type and bytes.
pub fn multipart_body(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File {
                name,
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, filename, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

/// Read status and JSON body of a response.
pub async fn into_parts(resp: ServiceResponse) -> (u16, Value) {
    let status = resp.status().as_u16();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

/// Send JSON with an optional bearer token.
pub async fn send_json<S>(
    app: &S,
    method: actix_web::http::Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (u16, Value)
where
    S: actix_web::dev::Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let mut req = test::TestRequest::default().method(method).uri(uri);
    if let Some(token) = token {
        req = req.insert_header(("Authorization", format!("Bearer {}", token)));
    }
    if let Some(body) = body {
        req = req.set_json(body);
    }

    into_parts(test::call_service(app, req.to_request()).await).await
}

/// Send a multipart form with an optional bearer token.
pub async fn send_multipart<S>(
    app: &S,
    method: actix_web::http::Method,
    uri: &str,
    token: Option<&str>,
    parts: &[Part<'_>],
) -> (u16, Value)
where
    S: actix_web::dev::Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (content_type, body) = multipart_body(parts);
    let mut req = test::TestRequest::default()
        .method(method)
        .uri(uri)
        .insert_header(("Content-Type", content_type))
        .set_payload(body);
    if let Some(token) = token {
        req = req.insert_header(("Authorization", format!("Bearer {}", token)));
    }

    into_parts(test::call_service(app, req.to_request()).await).await
}

/// Create a product through the API and return its id.
pub async fn create_product<S>(app: &S, token: &str, name: &str) -> String
where
    S: actix_web::dev::Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = send_json(
        app,
        actix_web::http::Method::POST,
        "/api/products",
        Some(token),
        Some(serde_json::json!({
            "name": name,
            "price": 19.99,
            "stock": 5,
        })),
    )
    .await;
    assert_eq!(status, 201, "Failed to create product: {}", body);
    body["id"].as_str().expect("product id").to_string()
}

/// Upload images and return the created image objects.
pub async fn upload_images<S>(
    app: &S,
    token: &str,
    product_id: &str,
    parts: &[Part<'_>],
) -> Vec<Value>
where
    S: actix_web::dev::Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = send_multipart(
        app,
        actix_web::http::Method::POST,
        &format!("/api/products/{}/images", product_id),
        Some(token),
        parts,
    )
    .await;
    assert_eq!(status, 201, "Failed to upload images: {}", body);
    body.as_array().expect("image array").clone()
}

/// Filename part of a stored `/uploads/products/<name>` url.
pub fn filename_of(url: &Value) -> String {
    url.as_str()
        .and_then(|u| u.rsplit('/').next())
        .expect("image url")
        .to_string()
}
