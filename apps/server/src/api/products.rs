//! Product CRUD. Reads are public, writes need an admin token.

use actix_web::{HttpResponse, web};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::BearerAuth;
use crate::db::{DbPool, categories, products};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateProductRequest, MessageResponse, Product, ProductWithCategory, UpdateProductRequest,
};
use crate::services::UploadStore;

fn with_category(
    (product, category): (crate::entity::product::Model, Option<crate::entity::category::Model>),
) -> ProductWithCategory {
    ProductWithCategory {
        product: product.into(),
        category: category.map(Into::into),
    }
}

/// A supplied category id must point at an existing category.
async fn check_category(pool: &DbPool, category_id: Option<Uuid>) -> AppResult<()> {
    if let Some(id) = category_id
        && !categories::exists(pool.connection(), id).await?
    {
        return Err(AppError::InvalidInput("Invalid category_id".to_string()));
    }
    Ok(())
}

/// List all products with their category, newest first.
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    responses(
        (status = 200, description = "All products", body = Vec<ProductWithCategory>),
    )
)]
pub async fn list_products(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let rows = products::list_with_category(pool.connection()).await?;
    let body: Vec<ProductWithCategory> = rows.into_iter().map(with_category).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Get one product with its category.
#[utoipa::path(
    get,
    path = "/api/products/{product_id}",
    tag = "Products",
    params(
        ("product_id" = Uuid, Path, description = "Product UUID")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductWithCategory),
        (status = 404, description = "Product not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_product(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let row = products::find_with_category(pool.connection(), path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(HttpResponse::Ok().json(with_category(row)))
}

/// Create a product.
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Validation failed or unknown category", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn create_product(
    auth: BearerAuth,
    pool: web::Data<DbPool>,
    body: web::Json<CreateProductRequest>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    let req = body.into_inner();
    req.validate()?;
    check_category(&pool, req.category_id).await?;

    let product = products::insert(pool.connection(), req).await?;
    info!("Created product {} '{}'", product.id, product.name);

    Ok(HttpResponse::Created().json(Product::from(product)))
}

/// Update a product. Absent fields are left unchanged.
#[utoipa::path(
    put,
    path = "/api/products/{product_id}",
    tag = "Products",
    params(
        ("product_id" = Uuid, Path, description = "Product UUID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Validation failed or unknown category", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn update_product(
    auth: BearerAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    let id = path.into_inner();
    let req = body.into_inner();
    req.validate()?;

    if products::find_by_id(pool.connection(), id).await?.is_none() {
        return Err(AppError::NotFound("Product not found".to_string()));
    }
    check_category(&pool, req.category_id).await?;

    let product = products::update(pool.connection(), id, req)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(HttpResponse::Ok().json(Product::from(product)))
}

/// Delete a product together with its images (rows and files).
#[utoipa::path(
    delete,
    path = "/api/products/{product_id}",
    tag = "Products",
    params(
        ("product_id" = Uuid, Path, description = "Product UUID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn delete_product(
    auth: BearerAuth,
    pool: web::Data<DbPool>,
    store: web::Data<UploadStore>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    let id = path.into_inner();

    let image_urls = products::delete_with_images(pool.connection(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    for url in &image_urls {
        store.remove_url(url).await;
    }

    info!("Deleted product {} and {} image(s)", id, image_urls.len());

    Ok(HttpResponse::Ok().json(MessageResponse::new("Product deleted successfully")))
}

/// Configure product routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/products")
            .route(web::get().to(list_products))
            .route(web::post().to(create_product)),
    )
    .service(
        web::resource("/products/{product_id}")
            .route(web::get().to(get_product))
            .route(web::put().to(update_product))
            .route(web::delete().to(delete_product)),
    );
}
