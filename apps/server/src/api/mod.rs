//! API endpoint modules.

pub mod categories;
pub mod health;
pub mod openapi;
pub mod product_images;
pub mod products;
pub mod users;

use actix_web::{HttpRequest, web};

use crate::error::AppError;

pub use categories::configure_routes as configure_category_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use product_images::configure_routes as configure_product_image_routes;
pub use products::configure_routes as configure_product_routes;
pub use users::configure_routes as configure_user_routes;

/// Register every `/api` route.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_health_routes)
        .configure(configure_user_routes)
        .configure(crate::services::configure_oauth_routes)
        .configure(configure_category_routes)
        .configure(configure_product_image_routes)
        .configure(configure_product_routes);
}

fn bad_request(message: String) -> actix_web::Error {
    AppError::InvalidInput(message).into()
}

/// JSON body errors answer 400 with the usual error body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        bad_request(format!("Invalid JSON body: {}", err))
    })
}

/// Malformed path parameters (e.g. a non-UUID id) answer 400.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req: &HttpRequest| bad_request(format!("Invalid path: {}", err)))
}

/// Malformed query strings answer 400.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req: &HttpRequest| bad_request(format!("Invalid query: {}", err)))
}
