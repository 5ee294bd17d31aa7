//! Catalog admin server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, http::header, web};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use catalog_admin_lib::api::{self, ApiDoc};
use catalog_admin_lib::auth::TokenService;
use catalog_admin_lib::config::Config;
use catalog_admin_lib::db::DbPool;
use catalog_admin_lib::middleware;
use catalog_admin_lib::services::UploadStore;

/// Perform health check (for Docker healthcheck).
fn health_check() -> bool {
    Config::from_env().is_ok()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Check for --health-check flag (used by Docker HEALTHCHECK)
    if std::env::args().any(|arg| arg == "--health-check") {
        dotenvy::dotenv().ok();
        std::process::exit(if health_check() { 0 } else { 1 });
    }

    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).map_err(std::io::Error::other)?;

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL and JWT_SECRET must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Catalog Admin Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
        info!("Using development defaults for DATABASE_URL and JWT_SECRET");
    }

    let pool = DbPool::new(&config).await.map_err(std::io::Error::other)?;
    info!("Database connection established");

    pool.run_migrations().await.map_err(std::io::Error::other)?;
    info!("Database migrations complete");

    let store = UploadStore::from_config(&config);
    store.ensure_dir().await.map_err(std::io::Error::other)?;
    info!("Storing product images in {}", store.dir().display());

    let tokens = TokenService::from_settings(&config.auth);

    if !config.oauth.google.is_configured() {
        info!("Google sign-in disabled (GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET not set)");
    }
    if !config.oauth.facebook.is_configured() {
        info!("Facebook sign-in disabled (FACEBOOK_CLIENT_ID/FACEBOOK_CLIENT_SECRET not set)");
    }

    info!(
        "Upload limits: {} bytes per file, {} files per request",
        config.uploads.max_file_size, config.uploads.max_files
    );

    let bind_address = config.bind_address();
    let worker_count = if config.is_development() {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!("Starting server at http://{} ({} workers)", bind_address, cpus);
        cpus
    };

    let uploads_root = config.uploads.dir.clone();
    let frontend_url = config.oauth.frontend_url.clone();
    let pool = web::Data::new(pool);
    let store = web::Data::new(store);
    let tokens = web::Data::new(tokens);
    let config = web::Data::new(config);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_url)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(middleware::RequestLogger)
            .app_data(pool.clone())
            .app_data(store.clone())
            .app_data(tokens.clone())
            .app_data(config.clone())
            .app_data(api::json_config())
            .app_data(api::path_config())
            .app_data(api::query_config())
            .service(web::scope("/api").configure(api::configure_routes))
            .service(Files::new("/uploads", uploads_root.clone()))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .workers(worker_count)
    .bind(&bind_address)?
    .run()
    .await
}
