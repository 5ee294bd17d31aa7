//! Product image models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::product::Product;

/// Product image as returned by the API, with its owning product.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Public path of the image file, e.g. `/uploads/products/images-1700000000000-42.png`
    pub url: String,
    pub alt_text: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
    pub product: Product,
}

impl ProductImage {
    pub fn from_parts(
        image: crate::entity::product_image::Model,
        product: crate::entity::product::Model,
    ) -> Self {
        Self {
            id: image.id,
            product_id: image.product_id,
            url: image.url,
            alt_text: image.alt_text,
            is_primary: image.is_primary,
            created_at: image.created_at,
            product: product.into(),
        }
    }
}

/// Plain confirmation message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
