//! Request and response models for the catalog API.

pub mod category;
pub mod product;
pub mod product_image;
pub mod user;

// Re-export commonly used types
pub use category::{Category, CategoryWithProducts, CreateCategoryRequest, UpdateCategoryRequest};
pub use product::{BadgeType, CreateProductRequest, Product, ProductWithCategory, UpdateProductRequest};
pub use product_image::{MessageResponse, ProductImage};
pub use user::{AuthProvider, RegisterRequest, Role, SignInRequest, SignInResponse, User};
