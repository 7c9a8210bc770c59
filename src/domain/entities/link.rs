//! Short link entity and its access policy.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;

/// A shortened URL record as held by the durable store.
///
/// The same shape is serialized into the look-aside cache. Accessibility is
/// never stored; it is derived from `active` and `expires_at` on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortLink {
    pub id: i64,
    pub code: String,
    pub custom_alias: Option<String>,
    pub target: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: i64,
    pub created_by: String,
    pub active: bool,
}

impl ShortLink {
    /// Returns true if `expires_at` is set and not in the future relative to `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Applies the access policy against `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Inactive`] for soft-deleted links (checked first, so an
    /// inactive link is never reported as merely expired) and
    /// [`AppError::Expired`] once the expiry time has been reached.
    pub fn check_access_at(&self, now: DateTime<Utc>) -> Result<(), AppError> {
        if !self.active {
            return Err(AppError::Inactive {
                code: self.code.clone(),
            });
        }

        if self.is_expired_at(now) {
            return Err(AppError::Expired {
                code: self.code.clone(),
            });
        }

        Ok(())
    }

    pub fn check_access(&self) -> Result<(), AppError> {
        self.check_access_at(Utc::now())
    }
}

/// Input data for inserting a new short link.
///
/// The store assigns `id`; `click_count` starts at zero and `active` at true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortLink {
    pub code: String,
    pub custom_alias: Option<String>,
    pub target: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewShortLink {
    /// Builds an insert for `code` stamped with `now`.
    ///
    /// A zero or absent `ttl` means the link never expires. Negative values are
    /// accepted and produce a link that is already expired.
    ///
    /// # Errors
    ///
    /// [`AppError::Validation`] if `now + ttl` is not a representable time.
    pub fn new(
        code: String,
        custom_alias: Option<String>,
        target: String,
        created_by: String,
        ttl: Option<TimeDelta>,
        now: DateTime<Utc>,
    ) -> Result<Self, AppError> {
        let expires_at = match ttl.filter(|ttl| !ttl.is_zero()) {
            Some(ttl) => Some(now.checked_add_signed(ttl).ok_or_else(|| {
                AppError::bad_request(
                    "TTL is out of range",
                    json!({ "ttl_seconds": ttl.num_seconds() }),
                )
            })?),
            None => None,
        };

        Ok(Self {
            code,
            custom_alias,
            target,
            created_by,
            created_at: now,
            expires_at,
        })
    }

    /// Materializes the record once the store has assigned an id.
    pub fn into_link(self, id: i64) -> ShortLink {
        ShortLink {
            id,
            code: self.code,
            custom_alias: self.custom_alias,
            target: self.target,
            created_at: self.created_at,
            expires_at: self.expires_at,
            click_count: 0,
            created_by: self.created_by,
            active: true,
        }
    }
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged.
/// `expires_at: Some(None)` clears the expiry; `Some(Some(t))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPatch {
    pub target: Option<String>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl LinkPatch {
    pub fn is_empty(&self) -> bool {
        self.target.is_none() && self.expires_at.is_none()
    }

    /// Returns `link` with the patch applied.
    pub fn apply(self, mut link: ShortLink) -> ShortLink {
        if let Some(target) = self.target {
            link.target = target;
        }
        if let Some(expires_at) = self.expires_at {
            link.expires_at = expires_at;
        }
        link
    }
}
