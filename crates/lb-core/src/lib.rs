//! # lb-core
//!
//! Core types and utilities for LightBnB RS.
//!
//! This crate provides the foundational building blocks used by the database layer:
//! - Common error types
//! - Result type aliases
//! - Primary key types
//! - Configuration types

pub mod config;
pub mod error;
pub mod types;

pub use error::*;
pub use types::*;
