//! Click job passed from the redirect path to the click worker.

use crate::domain::entities::ClickMeta;

/// A redirect that still has to be counted.
///
/// Carries the resolved code rather than whatever path segment the client
/// used, so alias redirects are counted against the right record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickJob {
    pub code: String,
    pub meta: ClickMeta,
}

impl ClickJob {
    pub fn new(code: impl Into<String>, meta: ClickMeta) -> Self {
        Self {
            code: code.into(),
            meta,
        }
    }
}
