//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog Admin Server",
        version = "0.1.0",
        description = "Admin API for an e-commerce catalog: users, categories, products and product images"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // User endpoints
        api::users::register,
        api::users::signin,
        // Category endpoints
        api::categories::list_categories,
        api::categories::get_category,
        api::categories::create_category,
        api::categories::update_category,
        api::categories::delete_category,
        // Product endpoints
        api::products::list_products,
        api::products::get_product,
        api::products::create_product,
        api::products::update_product,
        api::products::delete_product,
        // Product image endpoints
        api::product_images::create_images,
        api::product_images::list_images,
        api::product_images::get_image,
        api::product_images::update_image,
        api::product_images::delete_image,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            error::FieldError,
            models::MessageResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Users
            models::Role,
            models::User,
            models::RegisterRequest,
            models::SignInRequest,
            models::SignInResponse,
            // Catalog
            models::Category,
            models::CategoryWithProducts,
            models::CreateCategoryRequest,
            models::UpdateCategoryRequest,
            models::BadgeType,
            models::Product,
            models::ProductWithCategory,
            models::CreateProductRequest,
            models::UpdateProductRequest,
            models::ProductImage,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Users", description = "Registration and sign-in"),
        (name = "Categories", description = "Category management"),
        (name = "Products", description = "Product management"),
        (name = "Product Images", description = "Product image upload and management")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add bearer token security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
