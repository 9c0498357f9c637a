//! Property repository
//!
//! Database operations for properties.

use async_trait::async_trait;
use lb_core::config::CityMatch;
use lb_core::Id;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::property_search::{PropertyQuery, PropertySearch, SqlParam};
use crate::repository::{PropertyStore, RepositoryResult};

/// Property database entity
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyRow {
    pub id: Id,
    pub owner_id: Id,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_photo_url: String,
    pub cover_photo_url: String,
    /// Amount in cents
    pub cost_per_night: i32,
    pub parking_spaces: i32,
    pub number_of_bathrooms: i32,
    pub number_of_bedrooms: i32,
    pub country: String,
    pub street: String,
    pub city: String,
    pub province: String,
    pub post_code: String,
    pub active: bool,
    /// Average review rating; absent when the row was not aggregated
    pub average_rating: Option<f64>,
}

/// DTO for creating a property
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CreatePropertyDto {
    pub owner_id: Id,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_photo_url: String,
    pub cover_photo_url: String,
    pub cost_per_night: i32,
    pub parking_spaces: i32,
    pub number_of_bathrooms: i32,
    pub number_of_bedrooms: i32,
    pub country: String,
    pub street: String,
    pub city: String,
    pub province: String,
    pub post_code: String,
}

impl CreatePropertyDto {
    /// Row for this DTO under the given id, as the table defaults would fill it
    pub fn into_row(self, id: Id) -> PropertyRow {
        PropertyRow {
            id,
            owner_id: self.owner_id,
            title: self.title,
            description: self.description,
            thumbnail_photo_url: self.thumbnail_photo_url,
            cover_photo_url: self.cover_photo_url,
            cost_per_night: self.cost_per_night,
            parking_spaces: self.parking_spaces,
            number_of_bathrooms: self.number_of_bathrooms,
            number_of_bedrooms: self.number_of_bedrooms,
            country: self.country,
            street: self.street,
            city: self.city,
            province: self.province,
            post_code: self.post_code,
            active: true,
            average_rating: None,
        }
    }
}

/// Property repository implementation
#[derive(Clone)]
pub struct PropertyRepository {
    pool: PgPool,
    city_match: CityMatch,
}

impl PropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            city_match: CityMatch::default(),
        }
    }

    pub fn with_city_match(mut self, city_match: CityMatch) -> Self {
        self.city_match = city_match;
        self
    }
}

#[async_trait]
impl PropertyStore for PropertyRepository {
    async fn search(
        &self,
        filters: &PropertySearch,
        limit: i64,
    ) -> RepositoryResult<Vec<PropertyRow>> {
        let built = PropertyQuery::new(filters, limit, self.city_match).build();

        tracing::debug!(sql = %built.sql, params = ?built.params, "Searching properties");

        let mut query = sqlx::query_as::<_, PropertyRow>(&built.sql);
        for param in built.params {
            query = match param {
                SqlParam::Text(s) => query.bind(s),
                SqlParam::Int(i) => query.bind(i),
                SqlParam::BigInt(i) => query.bind(i),
                SqlParam::Float(f) => query.bind(f),
            };
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn create(&self, dto: CreatePropertyDto) -> RepositoryResult<PropertyRow> {
        let row = sqlx::query_as::<_, PropertyRow>(
            r#"
            INSERT INTO properties (
                owner_id, title, description, thumbnail_photo_url, cover_photo_url,
                cost_per_night, parking_spaces, number_of_bathrooms, number_of_bedrooms,
                country, street, city, province, post_code
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14
            )
            RETURNING properties.*, NULL::float8 AS average_rating
            "#,
        )
        .bind(dto.owner_id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.thumbnail_photo_url)
        .bind(&dto.cover_photo_url)
        .bind(dto.cost_per_night)
        .bind(dto.parking_spaces)
        .bind(dto.number_of_bathrooms)
        .bind(dto.number_of_bedrooms)
        .bind(&dto.country)
        .bind(&dto.street)
        .bind(&dto.city)
        .bind(&dto.province)
        .bind(&dto.post_code)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id = row.id, owner_id = row.owner_id, "Inserted property");

        Ok(row)
    }
}
