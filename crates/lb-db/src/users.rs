//! User repository
//!
//! Database operations for users.

use async_trait::async_trait;
use lb_core::Id;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};

use crate::repository::{RepositoryResult, UserStore};

/// User database entity
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserRow {
    pub id: Id,
    pub name: String,
    pub email: String,
    /// Stored as given by the caller
    pub password: String,
}

/// DTO for creating a user
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateUserDto {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// User repository implementation
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn create(&self, dto: CreateUserDto) -> RepositoryResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&dto.password)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id = row.id, email = %row.email, "Inserted user");

        Ok(row)
    }
}
