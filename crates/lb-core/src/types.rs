//! Common types used throughout LightBnB RS

/// Primary key type (SERIAL columns)
pub type Id = i32;

/// Default number of rows returned by list and search queries
pub const DEFAULT_LIMIT: i64 = 10;
