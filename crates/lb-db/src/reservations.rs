//! Reservation repository
//!
//! A guest's reservations joined with the reserved property and its average rating.

use async_trait::async_trait;
use chrono::NaiveDate;
use lb_core::Id;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::repository::{RepositoryResult, ReservationStore};

/// Reservation with property details
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct GuestReservationRow {
    pub id: Id,
    pub guest_id: Id,
    pub property_id: Id,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
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
    pub active: bool,
    pub average_rating: Option<f64>,
}

/// Reservation repository implementation
#[derive(Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationStore for ReservationRepository {
    async fn list_for_guest(
        &self,
        guest_id: Id,
        limit: i64,
    ) -> RepositoryResult<Vec<GuestReservationRow>> {
        let rows = sqlx::query_as::<_, GuestReservationRow>(
            r#"
            SELECT reservations.id, reservations.guest_id, reservations.property_id,
                   reservations.start_date, reservations.end_date,
                   properties.owner_id, properties.title, properties.description,
                   properties.thumbnail_photo_url, properties.cover_photo_url,
                   properties.cost_per_night, properties.parking_spaces,
                   properties.number_of_bathrooms, properties.number_of_bedrooms,
                   properties.country, properties.street, properties.city,
                   properties.province, properties.post_code, properties.active,
                   AVG(property_reviews.rating)::float8 AS average_rating
            FROM reservations
            JOIN properties ON properties.id = reservations.property_id
            JOIN property_reviews ON property_reviews.property_id = properties.id
            WHERE reservations.guest_id = $1
            GROUP BY properties.id, reservations.id
            ORDER BY reservations.start_date ASC
            LIMIT $2
            "#,
        )
        .bind(guest_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_dates_as_iso_strings() {
        let row = GuestReservationRow {
            id: 1,
            guest_id: 1,
            property_id: 2,
            start_date: NaiveDate::from_ymd_opt(2018, 9, 11).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2018, 9, 26).unwrap(),
            owner_id: 3,
            title: "Speed lamp".into(),
            description: None,
            thumbnail_photo_url: String::new(),
            cover_photo_url: String::new(),
            cost_per_night: 93061,
            parking_spaces: 6,
            number_of_bathrooms: 4,
            number_of_bedrooms: 8,
            country: "Canada".into(),
            street: "536 Namsub Highway".into(),
            city: "Sotboske".into(),
            province: "Quebec".into(),
            post_code: "28142".into(),
            active: true,
            average_rating: Some(3.8),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["start_date"], "2018-09-11");
        assert_eq!(json["end_date"], "2018-09-26");
        assert_eq!(json["average_rating"], 3.8);
    }
}
