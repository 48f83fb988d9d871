//! Payment gateway adapters.
//!
//! Real providers live outside this crate and plug in through the
//! `PaymentGateway` port. `DummyGateway` serves the `default` variant for
//! development and tests.

mod dummy;

use std::sync::Arc;

use crate::ports::{PaymentGateways, ReturnUrls};

pub use dummy::{DummyGateway, GatewayCall};

/// Variant served by [`DummyGateway`].
pub const DUMMY_VARIANT: &str = "default";

/// Gateways the binary can provide for the configured `variants`.
///
/// Only the `default` variant is backed, by [`DummyGateway`], and never in
/// production: the dummy confirms every charge. Other variants stay
/// unregistered until a provider adapter is plugged in, so payments and
/// renewals for them are refused instead of silently confirmed.
pub fn development_gateways(
    variants: &[String],
    return_urls: ReturnUrls,
    production: bool,
) -> PaymentGateways {
    let mut gateways = PaymentGateways::new();
    for variant in variants {
        if variant == DUMMY_VARIANT && !production {
            tracing::info!(variant = %variant, "Registering development gateway");
            gateways = gateways.with_variant(
                variant.clone(),
                Arc::new(DummyGateway::new().with_return_urls(return_urls.clone())),
            );
        } else {
            tracing::warn!(
                variant = %variant,
                production,
                "No gateway adapter for variant; payments through it are refused"
            );
        }
    }
    gateways
}
