//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and caching.
//!
//! # Modules
//!
//! - [`cache`] - Look-aside cache backends (Redis, in-memory, no-op)
//! - [`persistence`] - PostgreSQL and in-memory repositories

pub mod cache;
pub mod persistence;
