//! Domain layer containing business entities and rules.
//!
//! Everything here is independent of storage and transport. Repository traits
//! define the contracts the infrastructure layer implements.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures and the access policy
//! - [`repositories`] - Data access trait definitions
//! - [`validation`] - Target URL and alias checks
//! - [`click_job`] - Click message passed to the worker
//! - [`click_worker`] - Bounded-concurrency click processing
//!
//! # Click Processing Flow
//!
//! 1. The redirect handler resolves the link and answers the client
//! 2. A [`click_job::ClickJob`] is queued through [`click_worker::ClickDispatcher`]
//! 3. [`click_worker::run_click_worker`] hands it to a [`click_worker::ClickSink`]
//! 4. The sink increments the counter and appends the event

pub mod click_job;
pub mod click_worker;
pub mod entities;
pub mod repositories;
pub mod validation;
