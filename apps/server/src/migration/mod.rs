//! SeaORM database migrations.
//!
//! Statements are kept to SQL understood by both PostgreSQL and SQLite so the
//! same migrator prepares the test database.

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users;
mod m20250301_000002_create_categories;
mod m20250301_000003_create_products;
mod m20250301_000004_create_product_images;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users::Migration),
            Box::new(m20250301_000002_create_categories::Migration),
            Box::new(m20250301_000003_create_products::Migration),
            Box::new(m20250301_000004_create_product_images::Migration),
        ]
    }
}
