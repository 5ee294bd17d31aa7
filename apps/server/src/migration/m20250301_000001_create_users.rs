//! Migration: Create users table.
//!
//! Stores email/password users and users created through Google or Facebook sign-in.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            r#"
            CREATE TABLE users (
                id UUID PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                email VARCHAR(255) NOT NULL,
                password_hash VARCHAR(255),
                phone VARCHAR(32),
                role VARCHAR(20) NOT NULL DEFAULT 'customer'
                    CHECK (role IN ('customer', 'admin', 'delivery')),
                provider VARCHAR(20)
                    CHECK (provider IS NULL OR provider IN ('google', 'facebook')),
                social_id VARCHAR(255),

                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .await?;

        db.execute_unprepared("CREATE UNIQUE INDEX idx_users_email ON users(email)")
            .await?;

        // Social sign-in lookup
        db.execute_unprepared(
            "CREATE INDEX idx_users_social_id ON users(social_id) WHERE social_id IS NOT NULL",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS users")
            .await?;

        Ok(())
    }
}
