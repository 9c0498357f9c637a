//! Collapsed-error facade
//!
//! Keeps the historical contract of the booking API: a failed query is
//! logged and resolves to `None`, exactly like a lookup that found nothing.
//! New callers should use [`DataAccess`] directly, which reports the
//! difference.

use lb_core::Id;

use crate::access::DataAccess;
use crate::properties::{CreatePropertyDto, PropertyRow};
use crate::property_search::PropertySearch;
use crate::repository::{Lookup, RepositoryResult};
use crate::reservations::GuestReservationRow;
use crate::users::{CreateUserDto, UserRow};

#[derive(Clone)]
pub struct LegacyDatabase {
    inner: DataAccess,
}

impl LegacyDatabase {
    pub fn new(inner: DataAccess) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &DataAccess {
        &self.inner
    }

    pub async fn get_user_by_email(&self, email: &str) -> Option<UserRow> {
        collapse_lookup("get_user_by_email", self.inner.get_user_by_email(email).await)
    }

    pub async fn get_user_by_id(&self, id: Id) -> Option<UserRow> {
        collapse_lookup("get_user_by_id", self.inner.get_user_by_id(id).await)
    }

    /// Inserted rows, as returned by `RETURNING`
    pub async fn add_user(&self, user: CreateUserDto) -> Option<Vec<UserRow>> {
        collapse("add_user", self.inner.add_user(user).await).map(|row| vec![row])
    }

    pub async fn get_reservations_for_guest(
        &self,
        guest_id: Id,
        limit: Option<i64>,
    ) -> Option<Vec<GuestReservationRow>> {
        collapse(
            "get_reservations_for_guest",
            self.inner.get_reservations_for_guest(guest_id, limit).await,
        )
    }

    pub async fn search_properties(
        &self,
        filters: &PropertySearch,
        limit: Option<i64>,
    ) -> Option<Vec<PropertyRow>> {
        collapse(
            "search_properties",
            self.inner.search_properties(filters, limit).await,
        )
    }

    pub async fn add_property(&self, property: CreatePropertyDto) -> Option<PropertyRow> {
        collapse("add_property", self.inner.add_property(property).await)
    }
}

impl From<DataAccess> for LegacyDatabase {
    fn from(inner: DataAccess) -> Self {
        Self::new(inner)
    }
}

fn collapse<T>(operation: &'static str, result: RepositoryResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(operation, error = %e, "Query failed");
            None
        }
    }
}

fn collapse_lookup<T>(operation: &'static str, lookup: Lookup<T>) -> Option<T> {
    collapse(operation, lookup.into_result()).flatten()
}
