//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the marketplace.
//!
//! # Metrics
//!
//! - `market_listings_created_total` - Listings created
//! - `market_purchases_total` - Completed purchases
//! - `market_purchases_rejected_total` - Rejected purchase attempts
//! - `market_purchase_volume_tokens` - Tokens moved by completed purchases
//! - `market_reviews_total` - Reviews recorded
//! - `market_purchase_duration_seconds` - Histogram of purchase latencies

use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Listings created
    pub listings_created: IntCounter,

    /// Completed purchases
    pub purchases_total: IntCounter,

    /// Rejected purchase attempts
    pub purchases_rejected: IntCounter,

    /// Tokens moved by completed purchases
    pub purchase_volume: IntCounter,

    /// Reviews recorded
    pub reviews_total: IntCounter,

    /// Purchase latency histogram
    pub purchase_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let listings_created =
            IntCounter::new("market_listings_created_total", "Listings created")?;
        registry.register(Box::new(listings_created.clone()))?;

        let purchases_total =
            IntCounter::new("market_purchases_total", "Completed purchases")?;
        registry.register(Box::new(purchases_total.clone()))?;

        let purchases_rejected = IntCounter::new(
            "market_purchases_rejected_total",
            "Rejected purchase attempts",
        )?;
        registry.register(Box::new(purchases_rejected.clone()))?;

        let purchase_volume = IntCounter::new(
            "market_purchase_volume_tokens",
            "Tokens moved by completed purchases",
        )?;
        registry.register(Box::new(purchase_volume.clone()))?;

        let reviews_total = IntCounter::new("market_reviews_total", "Reviews recorded")?;
        registry.register(Box::new(reviews_total.clone()))?;

        let purchase_duration = Histogram::with_opts(
            HistogramOpts::new(
                "market_purchase_duration_seconds",
                "Histogram of purchase latencies",
            )
            .buckets(vec![0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0]),
        )?;
        registry.register(Box::new(purchase_duration.clone()))?;

        Ok(Self {
            listings_created,
            purchases_total,
            purchases_rejected,
            purchase_volume,
            reviews_total,
            purchase_duration,
            registry,
        })
    }

    /// Record listing creation
    pub fn record_listing_created(&self) {
        self.listings_created.inc();
    }

    /// Record a completed purchase of the given price
    pub fn record_purchase(&self, price: u64) {
        self.purchases_total.inc();
        self.purchase_volume.inc_by(price);
    }

    /// Record a rejected purchase attempt
    pub fn record_purchase_rejected(&self) {
        self.purchases_rejected.inc();
    }

    /// Record a review
    pub fn record_review(&self) {
        self.reviews_total.inc();
    }

    /// Record purchase duration
    pub fn record_purchase_duration(&self, duration_seconds: f64) {
        self.purchase_duration.observe(duration_seconds);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}
