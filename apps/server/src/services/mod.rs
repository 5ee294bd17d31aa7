//! Business logic services.

pub mod oauth;
pub mod product_images;
pub mod storage;
pub mod upload;

pub use oauth::configure_routes as configure_oauth_routes;
pub use storage::UploadStore;
