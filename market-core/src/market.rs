//! Main marketplace orchestration layer
//!
//! This module ties together storage, engine, and actor components into a
//! high-level API for listing, purchase, and review processing.
//!
//! # Example
//!
//! ```no_run
//! use market_core::{Config, Market};
//!
//! #[tokio::main]
//! async fn main() -> market_core::Result<()> {
//!     let config = Config::default();
//!     let market = Market::open(config).await?;
//!
//!     // let listing = market.create_listing(payload, caller).await?;
//!     // let bought = market.buy(listing.id, seller, buyer).await?;
//!
//!     market.shutdown().await
//! }
//! ```

use crate::{
    actor::{spawn_market_actor, MarketHandle},
    storage::StorageStats,
    types::{AccountId, Listing, ListingPayload, Review, ReviewPayload},
    Config, Metrics, Result, Storage,
};
use std::sync::Arc;
use uuid::Uuid;

/// Main marketplace interface
///
/// Mutations route through the single-writer actor; reads go straight to
/// storage.
pub struct Market {
    /// Actor handle for mutating operations
    handle: MarketHandle,

    /// Direct storage access (for reads)
    storage: Arc<Storage>,

    /// Metrics collector
    metrics: Metrics,

    /// Configuration
    config: Config,
}

impl Market {
    /// Open marketplace with configuration
    pub async fn open(config: Config) -> Result<Self> {
        // Open storage
        let storage = Arc::new(Storage::open(&config)?);

        // Metrics
        let metrics = Metrics::new()?;

        // Spawn actor
        let handle = spawn_market_actor(storage.clone(), metrics.clone(), config.mailbox_capacity);

        tracing::info!(service = %config.service_name, "Market opened");

        Ok(Self {
            handle,
            storage,
            metrics,
            config,
        })
    }

    /// Create a listing owned by the caller
    pub async fn create_listing(
        &self,
        payload: ListingPayload,
        caller: AccountId,
    ) -> Result<Listing> {
        self.handle.create_listing(payload, caller).await
    }

    /// Get a specific listing
    pub fn listing(&self, id: Uuid) -> Result<Listing> {
        self.storage.get_listing(id)
    }

    /// All active listings
    pub fn listings(&self) -> Result<Vec<Listing>> {
        self.storage.listings()
    }

    /// Delete a listing on behalf of its seller
    pub async fn delete_listing(&self, item_id: Uuid, caller: AccountId) -> Result<Listing> {
        self.handle.delete_listing(item_id, caller).await
    }

    /// Purchase a listing
    ///
    /// `seller` names the account to credit, exactly as supplied by the
    /// caller. Returns the purchased listing snapshot.
    pub async fn buy(&self, item_id: Uuid, seller: AccountId, caller: AccountId) -> Result<Listing> {
        self.handle.buy(item_id, seller, caller).await
    }

    /// Record a review against a sold item
    pub async fn add_review(&self, payload: ReviewPayload, reviewer: AccountId) -> Result<Review> {
        self.handle.add_review(payload, reviewer).await
    }

    /// Get a specific review
    pub fn review(&self, id: Uuid) -> Result<Review> {
        self.storage.get_review(id)
    }

    /// All recorded reviews
    pub fn reviews(&self) -> Result<Vec<Review>> {
        self.storage.reviews()
    }

    /// Token balance of an account (zero when absent)
    pub fn balance_of(&self, account: &AccountId) -> Result<u64> {
        self.storage.balance_of(account)
    }

    /// Overwrite an account balance
    pub async fn set_balance(&self, account: AccountId, amount: u64) -> Result<()> {
        self.handle.set_balance(account, amount).await
    }

    /// Whether an item has a sale record
    pub fn is_sold(&self, item_id: Uuid) -> Result<bool> {
        self.storage.is_sold(item_id)
    }

    /// Buyer recorded for a sold item, if any
    pub fn buyer_of(&self, item_id: Uuid) -> Result<Option<AccountId>> {
        self.storage.buyer_of(item_id)
    }

    /// Storage statistics
    pub fn stats(&self) -> Result<StorageStats> {
        self.storage.get_stats()
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Configuration the market was opened with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shutdown marketplace
    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_market() -> (Market, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();

        (Market::open(config).await.unwrap(), temp_dir)
    }

    fn payload(price: u64) -> ListingPayload {
        ListingPayload {
            name: "Harbor Goods".to_string(),
            location: "Pier 4".to_string(),
            zipcode: "00100".to_string(),
            continent: "Europe".to_string(),
            country: "Finland".to_string(),
            label: "general goods".to_string(),
            price,
            product: "crated widget".to_string(),
            description: "a widget in a crate".to_string(),
        }
    }

    #[tokio::test]
    async fn test_market_open_and_shutdown() {
        let (market, _temp) = create_test_market().await;
        market.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_listing_lifecycle() {
        let (market, _temp) = create_test_market().await;
        let seller = AccountId::new("seller-1");

        let listing = market
            .create_listing(payload(100), seller.clone())
            .await
            .unwrap();

        assert_eq!(market.listing(listing.id).unwrap(), listing);
        assert_eq!(market.listings().unwrap().len(), 1);

        let removed = market
            .delete_listing(listing.id, seller)
            .await
            .unwrap();
        assert_eq!(removed.id, listing.id);
        assert!(market.listings().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_purchase_and_review() {
        let (market, _temp) = create_test_market().await;
        let seller = AccountId::new("seller-1");
        let buyer = AccountId::new("buyer-1");

        market.set_balance(buyer.clone(), 150).await.unwrap();

        let listing = market
            .create_listing(payload(100), seller.clone())
            .await
            .unwrap();

        let bought = market
            .buy(listing.id, seller.clone(), buyer.clone())
            .await
            .unwrap();
        assert_eq!(bought.id, listing.id);

        assert_eq!(market.balance_of(&buyer).unwrap(), 50);
        assert_eq!(market.balance_of(&seller).unwrap(), 100);
        assert!(market.is_sold(listing.id).unwrap());
        assert_eq!(market.buyer_of(listing.id).unwrap(), Some(buyer.clone()));

        let review = market
            .add_review(
                ReviewPayload {
                    seller,
                    item_id: listing.id,
                    comment: "great".to_string(),
                    rating: 5,
                },
                buyer,
            )
            .await
            .unwrap();

        assert_eq!(market.review(review.id).unwrap(), review);
        assert_eq!(market.reviews().unwrap().len(), 1);

        let stats = market.stats().unwrap();
        assert_eq!(stats.total_listings, 0);
        assert_eq!(stats.total_sold_items, 1);
        assert_eq!(stats.total_reviews, 1);

        market.shutdown().await.unwrap();
    }
}
