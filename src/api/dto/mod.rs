//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization and validator
//! for input validation.

pub mod clicks;
pub mod create_url;
pub mod health;
pub mod link;
pub mod stats;
pub mod update_url;
