//! Category CRUD. Reads are public, writes need an admin token.

use actix_web::{HttpResponse, web};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::BearerAuth;
use crate::db::{DbPool, categories};
use crate::error::{AppError, AppResult};
use crate::models::{
    Category, CategoryWithProducts, CreateCategoryRequest, MessageResponse, UpdateCategoryRequest,
};

fn with_products(
    (category, products): (crate::entity::category::Model, Vec<crate::entity::product::Model>),
) -> CategoryWithProducts {
    CategoryWithProducts {
        category: category.into(),
        products: products.into_iter().map(Into::into).collect(),
    }
}

/// List all categories with their products.
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Categories",
    responses(
        (status = 200, description = "All categories", body = Vec<CategoryWithProducts>),
    )
)]
pub async fn list_categories(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let rows = categories::list_with_products(pool.connection()).await?;
    let body: Vec<CategoryWithProducts> = rows.into_iter().map(with_products).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Get one category with its products.
#[utoipa::path(
    get,
    path = "/api/categories/{category_id}",
    tag = "Categories",
    params(
        ("category_id" = Uuid, Path, description = "Category UUID")
    ),
    responses(
        (status = 200, description = "Category found", body = CategoryWithProducts),
        (status = 404, description = "Category not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_category(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let row = categories::find_with_products(pool.connection(), path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    Ok(HttpResponse::Ok().json(with_products(row)))
}

/// Create a category.
#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Validation failed", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn create_category(
    auth: BearerAuth,
    pool: web::Data<DbPool>,
    body: web::Json<CreateCategoryRequest>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    let req = body.into_inner();
    req.validate()?;

    let category = categories::insert(pool.connection(), req).await?;
    info!("Created category {} '{}'", category.id, category.name);

    Ok(HttpResponse::Created().json(Category::from(category)))
}

/// Update a category.
#[utoipa::path(
    put,
    path = "/api/categories/{category_id}",
    tag = "Categories",
    params(
        ("category_id" = Uuid, Path, description = "Category UUID")
    ),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, description = "Validation failed", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn update_category(
    auth: BearerAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCategoryRequest>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    let req = body.into_inner();
    req.validate()?;

    let category = categories::update(pool.connection(), path.into_inner(), req)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    Ok(HttpResponse::Ok().json(Category::from(category)))
}

/// Delete a category. Its products are kept without a category.
#[utoipa::path(
    delete,
    path = "/api/categories/{category_id}",
    tag = "Categories",
    params(
        ("category_id" = Uuid, Path, description = "Category UUID")
    ),
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn delete_category(
    auth: BearerAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    let id = path.into_inner();

    if !categories::delete(pool.connection(), id).await? {
        return Err(AppError::NotFound("Category not found".to_string()));
    }
    info!("Deleted category {}", id);

    Ok(HttpResponse::Ok().json(MessageResponse::new("Category deleted successfully")))
}

/// Configure category routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/categories")
            .route(web::get().to(list_categories))
            .route(web::post().to(create_category)),
    )
    .service(
        web::resource("/categories/{category_id}")
            .route(web::get().to(get_category))
            .route(web::put().to(update_category))
            .route(web::delete().to(delete_category)),
    );
}
