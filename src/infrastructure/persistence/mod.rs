//! Repository implementations.
//!
//! PostgreSQL repositories use SQLx with runtime-checked queries against the
//! schema in `migrations/`. The in-memory repositories provide the same
//! uniqueness and atomicity guarantees for single-process runs and tests.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] / [`MemoryLinkRepository`] - Short link storage
//! - [`PgClickRepository`] / [`MemoryClickRepository`] - Click log

pub mod memory_click_repository;
pub mod memory_link_repository;
pub mod pg_click_repository;
pub mod pg_link_repository;

pub use memory_click_repository::MemoryClickRepository;
pub use memory_link_repository::MemoryLinkRepository;
pub use pg_click_repository::PgClickRepository;
pub use pg_link_repository::PgLinkRepository;
