//! Product image endpoints (multipart upload, read, update, delete).
//!
//! The admin check runs before the multipart body is read, so a rejected
//! caller never leaves a file behind.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::auth::BearerAuth;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{MessageResponse, ProductImage};
use crate::services::UploadStore;
use crate::services::product_images;
use crate::services::upload::{UploadLimits, read_image_form};

/// Upload 1..N images for a product.
///
/// Multipart fields: `images` (files, image/* only), optional `alt_text` and
/// `is_primary` (single value or one per file).
#[utoipa::path(
    post,
    path = "/api/products/{product_id}/images",
    tag = "Product Images",
    params(
        ("product_id" = Uuid, Path, description = "Product UUID")
    ),
    request_body(content_type = "multipart/form-data", description = "Fields: images (files), alt_text, is_primary"),
    responses(
        (status = 201, description = "Images created", body = Vec<ProductImage>),
        (status = 400, description = "No images, non-image file or unexpected field", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::error::ErrorResponse),
        (status = 413, description = "Image too large", body = crate::error::ErrorResponse),
        (status = 500, description = "Failed to create product images", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn create_images(
    auth: BearerAuth,
    pool: web::Data<DbPool>,
    store: web::Data<UploadStore>,
    config: web::Data<Config>,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let limits = UploadLimits {
        max_files: config.uploads.max_files,
        max_file_size: config.uploads.max_file_size,
    };
    let form = read_image_form(payload, &store, limits).await?;

    let images = product_images::create_images(&pool, path.into_inner(), form).await?;

    Ok(HttpResponse::Created().json(images))
}

/// List a product's images, oldest first.
#[utoipa::path(
    get,
    path = "/api/products/{product_id}/images",
    tag = "Product Images",
    params(
        ("product_id" = Uuid, Path, description = "Product UUID")
    ),
    responses(
        (status = 200, description = "Images of the product", body = Vec<ProductImage>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 404, description = "No images found for this product", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn list_images(
    _auth: BearerAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let images = product_images::list_images(&pool, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(images))
}

/// Get one image of a product.
#[utoipa::path(
    get,
    path = "/api/products/{product_id}/images/{image_id}",
    tag = "Product Images",
    params(
        ("product_id" = Uuid, Path, description = "Product UUID"),
        ("image_id" = Uuid, Path, description = "Image UUID")
    ),
    responses(
        (status = 200, description = "Image found", body = ProductImage),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 404, description = "Image not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn get_image(
    _auth: BearerAuth,
    pool: web::Data<DbPool>,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (product_id, image_id) = path.into_inner();
    let image = product_images::get_image(&pool, product_id, image_id).await?;
    Ok(HttpResponse::Ok().json(image))
}

/// Update alt text, primary flag and/or replace the file of one image.
#[utoipa::path(
    put,
    path = "/api/products/{product_id}/images/{image_id}",
    tag = "Product Images",
    params(
        ("product_id" = Uuid, Path, description = "Product UUID"),
        ("image_id" = Uuid, Path, description = "Image UUID")
    ),
    request_body(content_type = "multipart/form-data", description = "Fields: images (at most one file), alt_text, is_primary"),
    responses(
        (status = 200, description = "Image updated", body = ProductImage),
        (status = 400, description = "Nothing to update or more than one file", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse),
        (status = 404, description = "Product image not found for this product", body = crate::error::ErrorResponse),
        (status = 500, description = "Failed to update product image", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn update_image(
    auth: BearerAuth,
    pool: web::Data<DbPool>,
    store: web::Data<UploadStore>,
    config: web::Data<Config>,
    path: web::Path<(Uuid, Uuid)>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    let (product_id, image_id) = path.into_inner();

    let limits = UploadLimits {
        max_files: 1,
        max_file_size: config.uploads.max_file_size,
    };
    let form = read_image_form(payload, &store, limits).await?;

    let image = product_images::update_image(&pool, &store, product_id, image_id, form).await?;

    Ok(HttpResponse::Ok().json(image))
}

/// Delete one image and its file.
#[utoipa::path(
    delete,
    path = "/api/products/{product_id}/images/{image_id}",
    tag = "Product Images",
    params(
        ("product_id" = Uuid, Path, description = "Product UUID"),
        ("image_id" = Uuid, Path, description = "Image UUID")
    ),
    responses(
        (status = 200, description = "Image deleted", body = MessageResponse),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse),
        (status = 404, description = "Image not found for this product", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn delete_image(
    auth: BearerAuth,
    pool: web::Data<DbPool>,
    store: web::Data<UploadStore>,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    let (product_id, image_id) = path.into_inner();

    let message = product_images::delete_image(&pool, &store, product_id, image_id).await?;

    Ok(HttpResponse::Ok().json(message))
}

/// Configure product image routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/products/{product_id}/images")
            .route(web::get().to(list_images))
            .route(web::post().to(create_images)),
    )
    .service(
        web::resource("/products/{product_id}/images/{image_id}")
            .route(web::get().to(get_image))
            .route(web::put().to(update_image))
            .route(web::delete().to(delete_image)),
    );
}
