//! Actor-based concurrency for the marketplace
//!
//! This module implements the single-writer pattern using Tokio actors:
//! every mutating operation runs to completion on one actor task before
//! the next is taken from the mailbox. The purchase sequence spans several
//! single-key writes; executing it on the actor is the mutual-exclusion
//! region that keeps two concurrent purchases of the same item from both
//! passing their checks.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │               MarketHandle (Clone)                    │
//! │         Sends messages to actor mailbox              │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │              MarketActor (Single Task)                │
//! │   engine::{create_listing, delete_listing,           │
//! │            execute_buy, add_review}                  │
//! │                       │                               │
//! │                       ▼                               │
//! │             Storage (RocksDB, per-key)                │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! Reads bypass the actor and hit storage directly; single-key reads are
//! linearizable on their own.

use crate::types::{AccountId, Listing, ListingPayload, Review, ReviewPayload};
use crate::{engine, Error, Metrics, Result, Storage};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

/// Message sent to the market actor
pub enum MarketMessage {
    /// Create a listing
    CreateListing {
        /// Creation payload
        payload: ListingPayload,
        /// Calling account
        caller: AccountId,
        /// Reply channel
        response: oneshot::Sender<Result<Listing>>,
    },

    /// Delete a listing on behalf of its seller
    DeleteListing {
        /// Listing to delete
        item_id: Uuid,
        /// Calling account
        caller: AccountId,
        /// Reply channel
        response: oneshot::Sender<Result<Listing>>,
    },

    /// Purchase a listing
    Buy {
        /// Listing to purchase
        item_id: Uuid,
        /// Account to credit, as named by the caller
        seller: AccountId,
        /// Calling account
        caller: AccountId,
        /// Reply channel
        response: oneshot::Sender<Result<Listing>>,
    },

    /// Record a review
    AddReview {
        /// Review payload
        payload: ReviewPayload,
        /// Calling account
        reviewer: AccountId,
        /// Reply channel
        response: oneshot::Sender<Result<Review>>,
    },

    /// Overwrite an account balance
    SetBalance {
        /// Account to write
        account: AccountId,
        /// New balance
        amount: u64,
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that processes market messages
pub struct MarketActor {
    /// Storage backend
    storage: Arc<Storage>,

    /// Metrics collector
    metrics: Metrics,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<MarketMessage>,
}

impl MarketActor {
    /// Create new actor
    pub fn new(
        storage: Arc<Storage>,
        metrics: Metrics,
        mailbox: mpsc::Receiver<MarketMessage>,
    ) -> Self {
        Self {
            storage,
            metrics,
            mailbox,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                MarketMessage::Shutdown => break,
                msg => self.handle_message(msg),
            }
        }

        tracing::debug!("Market actor stopped");
    }

    /// Handle a single message
    fn handle_message(&mut self, msg: MarketMessage) {
        match msg {
            MarketMessage::CreateListing {
                payload,
                caller,
                response,
            } => {
                let result = engine::create_listing(&self.storage, payload, &caller);
                if result.is_ok() {
                    self.metrics.record_listing_created();
                }
                let _ = response.send(result);
            }

            MarketMessage::DeleteListing {
                item_id,
                caller,
                response,
            } => {
                let result = engine::delete_listing(&self.storage, item_id, &caller);
                let _ = response.send(result);
            }

            MarketMessage::Buy {
                item_id,
                seller,
                caller,
                response,
            } => {
                let started = Instant::now();
                let result = engine::execute_buy(&self.storage, item_id, &seller, &caller);
                match &result {
                    Ok(listing) => {
                        self.metrics.record_purchase(listing.business.price);
                        self.metrics
                            .record_purchase_duration(started.elapsed().as_secs_f64());
                    }
                    Err(_) => self.metrics.record_purchase_rejected(),
                }
                let _ = response.send(result);
            }

            MarketMessage::AddReview {
                payload,
                reviewer,
                response,
            } => {
                let result = engine::add_review(&self.storage, payload, &reviewer);
                if result.is_ok() {
                    self.metrics.record_review();
                }
                let _ = response.send(result);
            }

            MarketMessage::SetBalance {
                account,
                amount,
                response,
            } => {
                let result = self.storage.set_balance(&account, amount);
                let _ = response.send(result);
            }

            MarketMessage::Shutdown => {
                // Handled in main loop
            }
        }
    }
}

/// Handle for sending messages to the actor
#[derive(Clone)]
pub struct MarketHandle {
    sender: mpsc::Sender<MarketMessage>,
}

impl MarketHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<MarketMessage>) -> Self {
        Self { sender }
    }

    /// Create a listing
    pub async fn create_listing(
        &self,
        payload: ListingPayload,
        caller: AccountId,
    ) -> Result<Listing> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MarketMessage::CreateListing {
                payload,
                caller,
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Delete a listing
    pub async fn delete_listing(&self, item_id: Uuid, caller: AccountId) -> Result<Listing> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MarketMessage::DeleteListing {
                item_id,
                caller,
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Purchase a listing
    pub async fn buy(
        &self,
        item_id: Uuid,
        seller: AccountId,
        caller: AccountId,
    ) -> Result<Listing> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MarketMessage::Buy {
                item_id,
                seller,
                caller,
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Record a review
    pub async fn add_review(&self, payload: ReviewPayload, reviewer: AccountId) -> Result<Review> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MarketMessage::AddReview {
                payload,
                reviewer,
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Overwrite an account balance
    pub async fn set_balance(&self, account: AccountId, amount: u64) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MarketMessage::SetBalance {
                account,
                amount,
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(MarketMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the market actor
pub fn spawn_market_actor(
    storage: Arc<Storage>,
    metrics: Metrics,
    mailbox_capacity: usize,
) -> MarketHandle {
    let (tx, rx) = mpsc::channel(mailbox_capacity); // Bounded channel for backpressure
    let actor = MarketActor::new(storage, metrics, rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    MarketHandle::new(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use tempfile::TempDir;

    fn test_storage() -> (Arc<Storage>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();
        (Arc::new(Storage::open(&config).unwrap()), temp_dir)
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
    async fn test_actor_spawn_and_shutdown() {
        let (storage, _temp) = test_storage();
        let handle = spawn_market_actor(storage, Metrics::new().unwrap(), 100);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_actor_purchase_flow() {
        let (storage, _temp) = test_storage();
        let metrics = Metrics::new().unwrap();
        let handle = spawn_market_actor(storage.clone(), metrics.clone(), 100);

        let seller = AccountId::new("seller-1");
        let buyer = AccountId::new("buyer-1");

        handle.set_balance(buyer.clone(), 150).await.unwrap();

        let listing = handle
            .create_listing(payload(100), seller.clone())
            .await
            .unwrap();

        let bought = handle
            .buy(listing.id, seller.clone(), buyer.clone())
            .await
            .unwrap();
        assert_eq!(bought.id, listing.id);

        assert_eq!(storage.balance_of(&buyer).unwrap(), 50);
        assert_eq!(storage.balance_of(&seller).unwrap(), 100);

        assert_eq!(metrics.listings_created.get(), 1);
        assert_eq!(metrics.purchases_total.get(), 1);
        assert_eq!(metrics.purchase_volume.get(), 100);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_actor_records_rejected_purchase() {
        let (storage, _temp) = test_storage();
        let metrics = Metrics::new().unwrap();
        let handle = spawn_market_actor(storage, metrics.clone(), 100);

        let result = handle
            .buy(
                Uuid::new_v4(),
                AccountId::new("seller-1"),
                AccountId::new("buyer-1"),
            )
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(metrics.purchases_rejected.get(), 1);

        handle.shutdown().await.unwrap();
    }
}
