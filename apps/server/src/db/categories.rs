//! Database operations for categories.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::category::{self, Entity as Category};
use crate::entity::product::{self, Entity as Product};
use crate::error::{AppError, AppResult};
use crate::models::category::{CreateCategoryRequest, UpdateCategoryRequest};

/// All categories, oldest first, each with its products.
pub async fn list_with_products(
    db: &DatabaseConnection,
) -> AppResult<Vec<(category::Model, Vec<product::Model>)>> {
    let rows = Category::find()
        .order_by_asc(category::Column::CreatedAt)
        .find_with_related(Product)
        .all(db)
        .await?;

    Ok(rows)
}

/// One category with its products.
pub async fn find_with_products(
    db: &DatabaseConnection,
    id: Uuid,
) -> AppResult<Option<(category::Model, Vec<product::Model>)>> {
    let mut rows = Category::find_by_id(id)
        .find_with_related(Product)
        .all(db)
        .await?;

    Ok(rows.pop())
}

pub async fn exists(db: &DatabaseConnection, id: Uuid) -> AppResult<bool> {
    Ok(Category::find_by_id(id).count(db).await? > 0)
}

pub async fn insert(db: &DatabaseConnection, req: CreateCategoryRequest) -> AppResult<category::Model> {
    let now = Utc::now();
    let model = category::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(req.name),
        description: Set(req.description),
        created_at: Set(now),
        updated_at: Set(now),
    };

    model
        .insert(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert category: {}", e)))
}

/// Apply the supplied fields. Returns `None` when the category does not exist.
pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    req: UpdateCategoryRequest,
) -> AppResult<Option<category::Model>> {
    let Some(existing) = Category::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let mut active: category::ActiveModel = existing.into();
    if let Some(name) = req.name {
        active.name = Set(name);
    }
    if let Some(description) = req.description {
        active.description = Set(Some(description));
    }
    active.updated_at = Set(Utc::now());

    Ok(Some(active.update(db).await?))
}

/// Delete a category. Its products stay, detached from any category.
///
/// Returns `false` when the category does not exist.
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> AppResult<bool> {
    let txn = db.begin().await?;

    Product::update_many()
        .col_expr(product::Column::CategoryId, Expr::value(Option::<Uuid>::None))
        .filter(product::Column::CategoryId.eq(id))
        .exec(&txn)
        .await?;

    let result = Category::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        // Nothing was detached either; dropping the transaction rolls back
        return Ok(false);
    }

    txn.commit().await?;
    Ok(true)
}
