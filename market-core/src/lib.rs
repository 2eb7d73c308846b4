//! Bazaar Market Core
//!
//! Marketplace ledger over a primitive key-value store: sellers list
//! products, buyers purchase them by transferring token balance, and
//! buyers leave reviews on items that have actually been sold.
//!
//! # Architecture
//!
//! - **Four independent collections**: listings, balances, sold-item
//!   records, and reviews, each a RocksDB column family with plain
//!   per-key get/insert/remove operations
//! - **Single Writer**: one actor task executes every mutating operation,
//!   so the multi-step purchase sequence never interleaves with another
//!   request
//! - **Errors as values**: `NotFound` / `BadRequest` / `Forbidden` are
//!   returned to the caller, never thrown through the stack
//!
//! # Invariants
//!
//! - Balances are never negative: a transfer requires payer balance ≥ price
//! - A sold-item record is write-once, and the listing it references is
//!   removed in the same serialized sequence
//! - Listing ids are never reused once removed
//!
//! # Known consistency gap
//!
//! The store offers no multi-key atomic commit, and the purchase sequence
//! deliberately performs its writes one key at a time in a fixed order
//! (debit buyer, credit seller, record sale, remove listing). A host crash
//! between those writes persists the completed prefix. The order is chosen
//! so the damage is auditable: funds move before the sale is recorded, and
//! the sale is recorded before the listing disappears. No rollback is
//! attempted.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod actor;
pub mod config;
pub mod engine;
pub mod error;
pub mod market;
pub mod metrics;
pub mod storage;
pub mod types;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use market::Market;
pub use metrics::Metrics;
pub use storage::Storage;
pub use types::{AccountId, Listing, ListingPayload, Review, ReviewPayload};
