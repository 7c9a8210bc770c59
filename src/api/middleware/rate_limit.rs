//! Per-client rate limiting using the token bucket algorithm.
//!
//! Buckets live in process memory; several instances behind a balancer each
//! enforce their own limit.

use anyhow::Context;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Limiter keyed by the socket peer address.
pub type PeerIpLayer =
    GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Limiter keyed by forwarding headers, falling back to the peer address.
pub type ForwardedIpLayer =
    GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Creates a limiter keyed by the client socket address.
///
/// Each client may send `burst` requests at once and then `per_second`
/// requests per second. Requests exceeding the limit receive
/// `429 Too Many Requests`.
///
/// # Errors
///
/// Fails if either value is zero.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/api/v1/urls", post(create_url_handler))
///     .layer(rate_limit::layer(10, 100)?);
/// ```
pub fn layer(per_second: u64, burst: u32) -> anyhow::Result<PeerIpLayer> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(replenish_interval_ms(per_second))
            .burst_size(burst)
            .finish()
            .context("invalid rate limit settings")?,
    );

    Ok(GovernorLayer::new(governor_conf))
}

/// Like [`layer`], but keys on `X-Forwarded-For` / `X-Real-IP` / `Forwarded`.
///
/// Only use this behind a proxy that overwrites those headers, otherwise
/// clients can pick their own bucket.
///
/// # Errors
///
/// Fails if either value is zero.
pub fn forwarded_layer(per_second: u64, burst: u32) -> anyhow::Result<ForwardedIpLayer> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(SmartIpKeyExtractor)
            .per_millisecond(replenish_interval_ms(per_second))
            .burst_size(burst)
            .finish()
            .context("invalid rate limit settings")?,
    );

    Ok(GovernorLayer::new(governor_conf))
}

/// Milliseconds between two replenished tokens. Zero stays zero so the
/// builder rejects it.
fn replenish_interval_ms(per_second: u64) -> u64 {
    if per_second == 0 {
        0
    } else {
        (1000 / per_second).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replenish_interval() {
        assert_eq!(replenish_interval_ms(0), 0);
        assert_eq!(replenish_interval_ms(1), 1000);
        assert_eq!(replenish_interval_ms(10), 100);
        assert_eq!(replenish_interval_ms(5000), 1);
    }

    #[test]
    fn test_zero_rate_is_rejected() {
        assert!(layer(0, 10).is_err());
        assert!(forwarded_layer(0, 10).is_err());
    }

    #[test]
    fn test_zero_burst_is_rejected() {
        assert!(layer(10, 0).is_err());
    }

    #[test]
    fn test_valid_settings() {
        assert!(layer(10, 100).is_ok());
        assert!(forwarded_layer(10, 100).is_ok());
    }
}
