//! Database queries for product images.
//!
//! Every multi-row mutation runs in one transaction. Clearing the previous
//! primary always happens before the new primary is written so the partial
//! unique index on `(product_id) WHERE is_primary` is never violated midway.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::entity::product_image::{self, ActiveModel, Entity as ProductImage};
use crate::error::{AppError, AppResult};

use super::DbPool;

/// Image row to insert for an already stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductImage {
    pub url: String,
    pub alt_text: String,
    pub is_primary: bool,
}

/// Field changes for one image; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductImageChanges {
    pub alt_text: Option<String>,
    pub is_primary: Option<bool>,
    pub url: Option<String>,
}

impl ProductImageChanges {
    pub fn is_empty(&self) -> bool {
        self.alt_text.is_none() && self.is_primary.is_none() && self.url.is_none()
    }
}

/// Clear the primary flag on every image of `product_id`, except `keep` if given.
async fn clear_primary<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    keep: Option<Uuid>,
) -> Result<u64, sea_orm::DbErr> {
    let mut query = ProductImage::update_many()
        .col_expr(product_image::Column::IsPrimary, Expr::value(false))
        .filter(product_image::Column::ProductId.eq(product_id))
        .filter(product_image::Column::IsPrimary.eq(true));

    if let Some(id) = keep {
        query = query.filter(product_image::Column::Id.ne(id));
    }

    Ok(query.exec(conn).await?.rows_affected)
}

impl DbPool {
    /// Insert a batch of images for one product atomically.
    ///
    /// When any new image is primary, the product's existing primary is
    /// cleared in the same transaction first.
    pub async fn insert_product_images(
        &self,
        product_id: Uuid,
        images: Vec<NewProductImage>,
    ) -> Result<Vec<product_image::Model>, sea_orm::DbErr> {
        let txn = self.connection().begin().await?;

        if images.iter().any(|img| img.is_primary) {
            clear_primary(&txn, product_id, None).await?;
        }

        let now = Utc::now();
        let mut inserted = Vec::with_capacity(images.len());

        for image in images {
            let model = ActiveModel {
                id: Set(Uuid::now_v7()),
                product_id: Set(product_id),
                url: Set(image.url),
                alt_text: Set(image.alt_text),
                is_primary: Set(image.is_primary),
                created_at: Set(now),
            };

            inserted.push(model.insert(&txn).await?);
        }

        txn.commit().await?;

        Ok(inserted)
    }

    /// All images of a product, oldest first.
    pub async fn list_product_images(
        &self,
        product_id: Uuid,
    ) -> AppResult<Vec<product_image::Model>> {
        ProductImage::find()
            .filter(product_image::Column::ProductId.eq(product_id))
            .order_by_asc(product_image::Column::CreatedAt)
            .order_by_asc(product_image::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list product images: {}", e)))
    }

    /// Look up an image, optionally requiring that it belongs to `product_id`.
    pub async fn find_product_image(
        &self,
        product_id: Option<Uuid>,
        image_id: Uuid,
    ) -> AppResult<Option<product_image::Model>> {
        let mut query = ProductImage::find_by_id(image_id);
        if let Some(product_id) = product_id {
            query = query.filter(product_image::Column::ProductId.eq(product_id));
        }

        query
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to fetch product image: {}", e)))
    }

    /// Apply `changes` to one image atomically.
    ///
    /// Setting the primary flag clears it on the product's other images in the
    /// same transaction. Returns `Ok(None)` when no row matched.
    pub async fn update_product_image(
        &self,
        product_id: Uuid,
        image_id: Uuid,
        changes: ProductImageChanges,
    ) -> Result<Option<product_image::Model>, sea_orm::DbErr> {
        let txn = self.connection().begin().await?;

        if changes.is_primary == Some(true) {
            clear_primary(&txn, product_id, Some(image_id)).await?;
        }

        let mut query = ProductImage::update_many()
            .filter(product_image::Column::Id.eq(image_id))
            .filter(product_image::Column::ProductId.eq(product_id));

        if let Some(alt_text) = changes.alt_text {
            query = query.col_expr(product_image::Column::AltText, Expr::value(alt_text));
        }
        if let Some(is_primary) = changes.is_primary {
            query = query.col_expr(product_image::Column::IsPrimary, Expr::value(is_primary));
        }
        if let Some(url) = changes.url {
            query = query.col_expr(product_image::Column::Url, Expr::value(url));
        }

        if query.exec(&txn).await?.rows_affected == 0 {
            return Ok(None);
        }

        let updated = ProductImage::find_by_id(image_id).one(&txn).await?;

        txn.commit().await?;

        Ok(updated)
    }

    /// Delete an image scoped to its product, returning the removed row.
    pub async fn delete_product_image(
        &self,
        product_id: Uuid,
        image_id: Uuid,
    ) -> AppResult<Option<product_image::Model>> {
        let Some(existing) = self.find_product_image(Some(product_id), image_id).await? else {
            return Ok(None);
        };

        ProductImage::delete_by_id(image_id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete product image: {}", e)))?;

        Ok(Some(existing))
    }

    /// Number of primary images a product currently has.
    pub async fn count_primary_images(&self, product_id: Uuid) -> AppResult<u64> {
        use sea_orm::PaginatorTrait;

        Ok(ProductImage::find()
            .filter(product_image::Column::ProductId.eq(product_id))
            .filter(product_image::Column::IsPrimary.eq(true))
            .count(self.connection())
            .await?)
    }
}
