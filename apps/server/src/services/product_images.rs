//! Product image lifecycle: rows in `product_images` plus files on disk.
//!
//! Files are written by the multipart boundary before any of these functions
//! run and stay tracked by the [`ImageForm`] until their rows commit. Returning
//! early, or being dropped mid-request, removes them. Beyond that:
//! - a replaced file is removed only after the new url has committed;
//! - a deleted row takes its file with it, best-effort.

use tracing::info;
use uuid::Uuid;

use super::storage::UploadStore;
use super::upload::ImageForm;
use crate::db::{DbPool, products};
use crate::entity::product;
use crate::error::{AppError, AppResult};
use crate::models::{MessageResponse, ProductImage};

async fn load_product(pool: &DbPool, product_id: Uuid) -> AppResult<product::Model> {
    products::find_by_id(pool.connection(), product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// Create one image row per uploaded file.
///
/// If any new image is primary, the product's current primary is cleared in
/// the same transaction as the inserts.
pub async fn create_images(
    pool: &DbPool,
    product_id: Uuid,
    mut form: ImageForm,
) -> AppResult<Vec<ProductImage>> {
    if form.files.is_empty() {
        return Err(AppError::InvalidInput("No images uploaded".to_string()));
    }

    let product = load_product(pool, product_id).await?;

    let records = form.batch_images();
    let inserted = pool
        .insert_product_images(product_id, records)
        .await
        .map_err(|e| AppError::internal("Failed to create product images", e))?;
    form.keep_files();

    info!(
        "Created {} image(s) for product {} (primary: {})",
        inserted.len(),
        product_id,
        inserted.iter().any(|img| img.is_primary)
    );

    Ok(inserted
        .into_iter()
        .map(|image| ProductImage::from_parts(image, product.clone()))
        .collect())
}

/// All images of a product, oldest first. An empty list is `NotFound`.
pub async fn list_images(pool: &DbPool, product_id: Uuid) -> AppResult<Vec<ProductImage>> {
    let images = pool.list_product_images(product_id).await?;
    if images.is_empty() {
        return Err(AppError::NotFound(
            "No images found for this product".to_string(),
        ));
    }

    let product = load_product(pool, product_id).await?;

    Ok(images
        .into_iter()
        .map(|image| ProductImage::from_parts(image, product.clone()))
        .collect())
}

/// One image, which must belong to `product_id`.
pub async fn get_image(pool: &DbPool, product_id: Uuid, image_id: Uuid) -> AppResult<ProductImage> {
    let image = pool
        .find_product_image(Some(product_id), image_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

    let product = load_product(pool, image.product_id).await?;

    Ok(ProductImage::from_parts(image, product))
}

/// Update alt text, primary flag and/or the file of one image.
///
/// The previous file is removed only after the new url has committed. On any
/// failure the newly uploaded file is removed and the row is left unchanged.
pub async fn update_image(
    pool: &DbPool,
    store: &UploadStore,
    product_id: Uuid,
    image_id: Uuid,
    mut form: ImageForm,
) -> AppResult<ProductImage> {
    let changes = form.changes();
    if changes.is_empty() {
        return Err(AppError::InvalidInput(
            "No fields to update. Provide image, alt_text and/or is_primary".to_string(),
        ));
    }

    let existing = pool
        .find_product_image(Some(product_id), image_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Product image not found for this product".to_string())
        })?;

    let replaces_file = changes.url.is_some();
    let updated = match pool.update_product_image(product_id, image_id, changes).await {
        Ok(Some(updated)) => updated,
        Ok(None) => return Err(AppError::NotFound("Product image not found".to_string())),
        Err(e) => return Err(AppError::internal("Failed to update product image", e)),
    };
    form.keep_files();

    if replaces_file {
        store.remove_url(&existing.url).await;
    }

    info!(
        "Updated image {} of product {} (file replaced: {})",
        image_id, product_id, replaces_file
    );

    let product = load_product(pool, product_id).await?;
    Ok(ProductImage::from_parts(updated, product))
}

/// Delete one image row, then its file. File removal never fails the request.
pub async fn delete_image(
    pool: &DbPool,
    store: &UploadStore,
    product_id: Uuid,
    image_id: Uuid,
) -> AppResult<MessageResponse> {
    let removed = pool
        .delete_product_image(product_id, image_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found for this product".to_string()))?;

    store.remove_url(&removed.url).await;

    info!("Deleted image {} of product {}", image_id, product_id);

    Ok(MessageResponse::new("Image deleted successfully"))
}
