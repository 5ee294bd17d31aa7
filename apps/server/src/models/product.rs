//! Product models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::category::Category;

/// Merchandising badge shown on a product card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BadgeType {
    HotDeal,
    BestSeller,
    NewArrival,
    Featured,
}

impl BadgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HotDeal => "hot_deal",
            Self::BestSeller => "best_seller",
            Self::NewArrival => "new_arrival",
            Self::Featured => "featured",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hot_deal" => Some(Self::HotDeal),
            "best_seller" => Some(Self::BestSeller),
            "new_arrival" => Some(Self::NewArrival),
            "featured" => Some(Self::Featured),
            _ => None,
        }
    }
}

/// Product as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub original_price: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub stock: i32,
    pub category_id: Option<Uuid>,
    pub brand: Option<String>,
    pub is_featured: bool,
    pub badge_type: Option<BadgeType>,
    pub average_rating: Option<f64>,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::product::Model> for Product {
    fn from(m: crate::entity::product::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            price: m.price,
            original_price: m.original_price,
            discount_percentage: m.discount_percentage,
            stock: m.stock,
            category_id: m.category_id,
            brand: m.brand,
            is_featured: m.is_featured,
            badge_type: m.badge_type.as_deref().and_then(BadgeType::parse),
            average_rating: m.average_rating,
            review_count: m.review_count,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Product together with its category, if any.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductWithCategory {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required and max 255 chars"))]
    pub name: String,
    #[validate(length(max = 1000, message = "Description max 1000 chars"))]
    pub description: Option<String>,
    #[validate(range(min = 0.01, message = "Price must be positive number"))]
    pub price: f64,
    #[validate(range(min = 0.01, message = "Original price positive"))]
    pub original_price: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0, message = "Discount 0-100%"))]
    pub discount_percentage: Option<f64>,
    #[validate(range(min = 0, message = "Stock non-negative integer"))]
    pub stock: i32,
    pub category_id: Option<Uuid>,
    #[validate(length(max = 100, message = "Brand max 100 chars"))]
    pub brand: Option<String>,
    pub is_featured: Option<bool>,
    pub badge_type: Option<BadgeType>,
    #[validate(range(min = 0.0, max = 5.0, message = "Average rating 0-5"))]
    pub average_rating: Option<f64>,
    #[validate(range(min = 0, message = "Review count non-negative"))]
    pub review_count: Option<i32>,
}

/// Partial product update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Name max 255 chars"))]
    pub name: Option<String>,
    #[validate(length(max = 1000, message = "Description max 1000 chars"))]
    pub description: Option<String>,
    #[validate(range(min = 0.01, message = "Price positive"))]
    pub price: Option<f64>,
    #[validate(range(min = 0.01, message = "Original price positive"))]
    pub original_price: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0, message = "Discount 0-100%"))]
    pub discount_percentage: Option<f64>,
    #[validate(range(min = 0, message = "Stock non-negative"))]
    pub stock: Option<i32>,
    pub category_id: Option<Uuid>,
    #[validate(length(max = 100, message = "Brand max 100 chars"))]
    pub brand: Option<String>,
    pub is_featured: Option<bool>,
    pub badge_type: Option<BadgeType>,
    #[validate(range(min = 0.0, max = 5.0, message = "Average rating 0-5"))]
    pub average_rating: Option<f64>,
    #[validate(range(min = 0, message = "Review count non-negative"))]
    pub review_count: Option<i32>,
}
