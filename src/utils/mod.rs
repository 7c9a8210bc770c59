//! Utility functions shared across the application.
//!
//! - [`code_generator`] - Random short code generation
//! - [`deadline`] - Timeouts for backend calls

pub mod code_generator;
pub mod deadline;
