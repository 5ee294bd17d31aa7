//! Database operations for products.

use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::category::{self, Entity as Category};
use crate::entity::product::{self, Entity as Product};
use crate::entity::product_image::{self, Entity as ProductImage};
use crate::error::{AppError, AppResult};
use crate::models::product::{CreateProductRequest, UpdateProductRequest};

/// All products, newest first, each with its category.
pub async fn list_with_category(
    db: &DatabaseConnection,
) -> AppResult<Vec<(product::Model, Option<category::Model>)>> {
    let rows = Product::find()
        .order_by_desc(product::Column::CreatedAt)
        .order_by_desc(product::Column::Id)
        .find_also_related(Category)
        .all(db)
        .await?;

    Ok(rows)
}

/// One product with its category.
pub async fn find_with_category(
    db: &DatabaseConnection,
    id: Uuid,
) -> AppResult<Option<(product::Model, Option<category::Model>)>> {
    let row = Product::find_by_id(id)
        .find_also_related(Category)
        .one(db)
        .await?;

    Ok(row)
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Option<product::Model>> {
    Ok(Product::find_by_id(id).one(db).await?)
}

pub async fn insert(db: &DatabaseConnection, req: CreateProductRequest) -> AppResult<product::Model> {
    let now = Utc::now();
    let model = product::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(req.name),
        description: Set(req.description),
        price: Set(req.price),
        original_price: Set(req.original_price),
        discount_percentage: Set(req.discount_percentage),
        stock: Set(req.stock),
        category_id: Set(req.category_id),
        brand: Set(req.brand),
        is_featured: Set(req.is_featured.unwrap_or(false)),
        badge_type: Set(req.badge_type.map(|b| b.as_str().to_string())),
        average_rating: Set(req.average_rating),
        review_count: Set(req.review_count.unwrap_or(0)),
        created_at: Set(now),
        updated_at: Set(now),
    };

    model
        .insert(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert product: {}", e)))
}

/// Apply the supplied fields. Returns `None` when the product does not exist.
pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    req: UpdateProductRequest,
) -> AppResult<Option<product::Model>> {
    let Some(existing) = Product::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let mut active: product::ActiveModel = existing.into();
    if let Some(name) = req.name {
        active.name = Set(name);
    }
    if let Some(description) = req.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = req.price {
        active.price = Set(price);
    }
    if let Some(original_price) = req.original_price {
        active.original_price = Set(Some(original_price));
    }
    if let Some(discount) = req.discount_percentage {
        active.discount_percentage = Set(Some(discount));
    }
    if let Some(stock) = req.stock {
        active.stock = Set(stock);
    }
    if let Some(category_id) = req.category_id {
        active.category_id = Set(Some(category_id));
    }
    if let Some(brand) = req.brand {
        active.brand = Set(Some(brand));
    }
    if let Some(is_featured) = req.is_featured {
        active.is_featured = Set(is_featured);
    }
    if let Some(badge) = req.badge_type {
        active.badge_type = Set(Some(badge.as_str().to_string()));
    }
    if let Some(rating) = req.average_rating {
        active.average_rating = Set(Some(rating));
    }
    if let Some(count) = req.review_count {
        active.review_count = Set(count);
    }
    active.updated_at = Set(Utc::now());

    Ok(Some(active.update(db).await?))
}

/// Delete a product and its image rows in one transaction.
///
/// Returns the urls of the removed images so the caller can delete the files,
/// or `None` when the product does not exist.
pub async fn delete_with_images(db: &DatabaseConnection, id: Uuid) -> AppResult<Option<Vec<String>>> {
    let txn = db.begin().await?;

    let urls: Vec<String> = ProductImage::find()
        .filter(product_image::Column::ProductId.eq(id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|image| image.url)
        .collect();

    ProductImage::delete_many()
        .filter(product_image::Column::ProductId.eq(id))
        .exec(&txn)
        .await?;

    let result = Product::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Ok(None);
    }

    txn.commit().await?;
    Ok(Some(urls))
}
