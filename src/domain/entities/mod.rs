//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`ShortLink`] - A short code mapped to a target URL
//! - [`ClickEvent`] - A recorded redirect of a short link
//!
//! Entities are paired with separate input structs for creation
//! ([`NewShortLink`], [`NewClickEvent`]) and partial updates ([`LinkPatch`]).

pub mod click;
pub mod link;

pub use click::{ClickEvent, ClickMeta, NewClickEvent};
pub use link::{LinkPatch, NewShortLink, ShortLink};
