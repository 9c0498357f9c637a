//! # lb-db
//!
//! Database layer for LightBnB RS.
//!
//! This crate provides PostgreSQL database access using SQLx, including:
//!
//! - Connection pool management
//! - User lookup and registration
//! - Reservation listing for a guest
//! - Filtered property search
//! - Property registration, persistent or in-memory
//!
//! ## Example
//!
//! ```ignore
//! use lb_core::config::AppConfig;
//! use lb_db::{DataAccess, PropertySearch};
//!
//! let config = AppConfig::load()?;
//! let db = DataAccess::connect(&config).await?;
//!
//! let search = PropertySearch::new().city("Vancouver").minimum_rating(4.0);
//! let properties = db.search_properties(&search, Some(5)).await?;
//! ```

pub mod access;
pub mod compat;
pub mod pool;
pub mod properties;
pub mod property_search;
pub mod property_store;
pub mod repository;
pub mod reservations;
pub mod users;

// Re-exports
pub use access::DataAccess;
pub use compat::LegacyDatabase;
pub use pool::{Database, PoolStats};
pub use properties::{CreatePropertyDto, PropertyRepository, PropertyRow};
pub use property_search::{BuiltQuery, PropertyQuery, PropertySearch, SqlParam};
pub use property_store::InMemoryPropertyStore;
pub use repository::{
    Lookup, PropertyStore, RepositoryError, RepositoryResult, ReservationStore, UserStore,
};
pub use reservations::{GuestReservationRow, ReservationRepository};
pub use users::{CreateUserDto, UserRepository, UserRow};
