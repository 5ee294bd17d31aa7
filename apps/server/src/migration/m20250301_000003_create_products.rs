//! Migration: Create products table.
//!
//! Products survive deletion of their category (category_id is set to NULL).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            r#"
            CREATE TABLE products (
                id UUID PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                description VARCHAR(1000),
                price DOUBLE PRECISION NOT NULL CHECK (price > 0),
                original_price DOUBLE PRECISION,
                discount_percentage DOUBLE PRECISION
                    CHECK (discount_percentage IS NULL OR (discount_percentage >= 0 AND discount_percentage <= 100)),
                stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
                category_id UUID REFERENCES categories(id) ON DELETE SET NULL,
                brand VARCHAR(100),
                is_featured BOOLEAN NOT NULL DEFAULT FALSE,
                badge_type VARCHAR(20)
                    CHECK (badge_type IS NULL OR badge_type IN ('hot_deal', 'best_seller', 'new_arrival', 'featured')),
                average_rating DOUBLE PRECISION
                    CHECK (average_rating IS NULL OR (average_rating >= 0 AND average_rating <= 5)),
                review_count INTEGER NOT NULL DEFAULT 0 CHECK (review_count >= 0),

                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .await?;

        db.execute_unprepared("CREATE INDEX idx_products_category_id ON products(category_id)")
            .await?;

        db.execute_unprepared("CREATE INDEX idx_products_created_at ON products(created_at)")
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS products")
            .await?;

        Ok(())
    }
}
