//! Application state shared across handlers.

use std::sync::Arc;

use bagworks_core::pricing::{ShippingPolicy, TaxPolicy};
use sqlx::PgPool;

use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, pool }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The configured shipping policy.
    #[must_use]
    pub fn shipping_policy(&self) -> &ShippingPolicy {
        &self.inner.config.shipping
    }

    /// The configured tax policy.
    #[must_use]
    pub fn tax_policy(&self) -> &TaxPolicy {
        &self.inner.config.tax
    }
}
