//! Migration: Create product_images table.
//!
//! The partial unique index guarantees at most one primary image per product,
//! so two concurrent uploads cannot both leave a primary behind.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            r#"
            CREATE TABLE product_images (
                id UUID PRIMARY KEY,
                product_id UUID NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                url VARCHAR(500) NOT NULL,
                alt_text VARCHAR(255) NOT NULL,
                is_primary BOOLEAN NOT NULL DEFAULT FALSE,

                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX idx_product_images_product_id ON product_images(product_id, created_at)",
        )
        .await?;

        db.execute_unprepared(
            "CREATE UNIQUE INDEX idx_product_images_one_primary ON product_images(product_id) WHERE is_primary",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS product_images")
            .await?;

        Ok(())
    }
}
