//! Repository traits and shared result types
//!
//! Each store trait is the seam callers depend on; the PostgreSQL
//! repositories and the in-memory property store implement them.

use async_trait::async_trait;
use lb_core::{Id, LbError};

use crate::properties::{CreatePropertyDto, PropertyRow};
use crate::property_search::PropertySearch;
use crate::reservations::GuestReservationRow;
use crate::users::{CreateUserDto, UserRow};

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<RepositoryError> for LbError {
    fn from(err: RepositoryError) -> Self {
        LbError::Database(err.to_string())
    }
}

/// Outcome of a single-row lookup
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    StoreError(RepositoryError),
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Lookup::NotFound)
    }

    /// The value, discarding the distinction between absent and failed
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_result(self) -> RepositoryResult<Option<T>> {
        match self {
            Lookup::Found(value) => Ok(Some(value)),
            Lookup::NotFound => Ok(None),
            Lookup::StoreError(err) => Err(err),
        }
    }
}

impl<T> From<RepositoryResult<Option<T>>> for Lookup<T> {
    fn from(result: RepositoryResult<Option<T>>) -> Self {
        match result {
            Ok(Some(value)) => Lookup::Found(value),
            Ok(None) => Lookup::NotFound,
            Err(err) => Lookup::StoreError(err),
        }
    }
}

/// User lookup and registration
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find the user whose email matches exactly
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<UserRow>>;

    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<UserRow>>;

    /// Insert a user and return the stored row
    async fn create(&self, dto: CreateUserDto) -> RepositoryResult<UserRow>;
}

/// Reservation listing
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Reservations of one guest, earliest start first
    async fn list_for_guest(
        &self,
        guest_id: Id,
        limit: i64,
    ) -> RepositoryResult<Vec<GuestReservationRow>>;
}

/// Property search and registration
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PropertyStore: Send + Sync {
    async fn search(
        &self,
        filters: &PropertySearch,
        limit: i64,
    ) -> RepositoryResult<Vec<PropertyRow>>;

    async fn create(&self, dto: CreatePropertyDto) -> RepositoryResult<PropertyRow>;
}
