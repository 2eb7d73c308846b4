//! Storage layer using RocksDB
//!
//! # Column Families
//!
//! - `listings` - Active product listings (key: listing_id)
//! - `balances` - Per-account token balances (key: account id bytes)
//! - `sold_items` - Write-once sale records (key: listing_id, value: buyer)
//! - `reviews` - Buyer reviews (key: review_id)
//!
//! The four collections are independent: there is no multi-key atomic
//! commit spanning them. Each method here touches exactly one key in one
//! column family; the transaction engine is responsible for ordering its
//! writes so that a partial sequence remains auditable.

use crate::{
    error::{Error, Result},
    types::{AccountId, Listing, Review},
    Config,
};
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBCompactionStyle, IteratorMode, Options, DB,
};
use std::sync::Arc;
use uuid::Uuid;

/// Column family names
const CF_LISTINGS: &str = "listings";
const CF_BALANCES: &str = "balances";
const CF_SOLD_ITEMS: &str = "sold_items";
const CF_REVIEWS: &str = "reviews";

/// Storage wrapper for RocksDB
pub struct Storage {
    db: Arc<DB>,
    // Column family handles are stored in DB, accessed by name
}

impl Storage {
    /// Open or create database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        // Create directory if not exists
        std::fs::create_dir_all(path)?;

        // Database options
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Tuning from config
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_target_file_size_base(config.rocksdb.target_file_size_mb * 1024 * 1024);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);
        db_opts.set_level_zero_file_num_compaction_trigger(
            config.rocksdb.level0_file_num_compaction_trigger,
        );

        // Point-lookup workload, keep level compaction defaults shallow
        db_opts.set_compaction_style(DBCompactionStyle::Level);

        // Enable statistics
        if config.rocksdb.enable_statistics {
            db_opts.enable_statistics();
        }

        // Column family descriptors
        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_LISTINGS, Self::cf_options_listings()),
            ColumnFamilyDescriptor::new(CF_BALANCES, Self::cf_options_balances()),
            ColumnFamilyDescriptor::new(CF_SOLD_ITEMS, Self::cf_options_sold_items()),
            ColumnFamilyDescriptor::new(CF_REVIEWS, Self::cf_options_reviews()),
        ];

        // Open database
        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!("Opened RocksDB at {:?}", path);

        Ok(Self { db: Arc::new(db) })
    }

    // Column family options

    fn cf_options_listings() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf_options_balances() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        // Balances are pure point lookups
        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false); // 10 bits per key
        opts.set_block_based_table_factory(&block_opts);
        opts
    }

    fn cf_options_sold_items() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        opts.set_block_based_table_factory(&block_opts);
        opts
    }

    fn cf_options_reviews() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
        opts
    }

    // Helper: get column family handle

    fn cf_handle(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", name)))
    }

    // Listing store

    /// Insert or overwrite a listing
    pub fn put_listing(&self, listing: &Listing) -> Result<()> {
        let cf = self.cf_handle(CF_LISTINGS)?;
        let key = listing.id.as_bytes();
        let value = bincode::serialize(listing)?;

        self.db.put_cf(&cf, key, &value)?;

        tracing::debug!(
            listing_id = %listing.id,
            seller = %listing.seller,
            "Listing stored"
        );

        Ok(())
    }

    /// Get listing by ID
    pub fn get_listing(&self, id: Uuid) -> Result<Listing> {
        let cf = self.cf_handle(CF_LISTINGS)?;
        let key = id.as_bytes();

        let value = self
            .db
            .get_cf(&cf, key)?
            .ok_or_else(|| Error::NotFound(format!("no listing with id {}", id)))?;

        let listing: Listing = bincode::deserialize(&value)?;
        Ok(listing)
    }

    /// Remove listing by ID, returning the removed entry
    pub fn remove_listing(&self, id: Uuid) -> Result<Listing> {
        let listing = self.get_listing(id)?;

        let cf = self.cf_handle(CF_LISTINGS)?;
        self.db.delete_cf(&cf, id.as_bytes())?;

        tracing::debug!(listing_id = %id, "Listing removed");

        Ok(listing)
    }

    /// All active listings (order irrelevant)
    pub fn listings(&self) -> Result<Vec<Listing>> {
        let cf = self.cf_handle(CF_LISTINGS)?;

        let mut listings = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = item?;
            listings.push(bincode::deserialize(&value)?);
        }

        Ok(listings)
    }

    // Balance ledger

    /// Token balance of an account; an absent entry reads as zero
    pub fn balance_of(&self, account: &AccountId) -> Result<u64> {
        let cf = self.cf_handle(CF_BALANCES)?;

        match self.db.get_cf(&cf, account.as_str().as_bytes())? {
            Some(value) => Ok(bincode::deserialize(&value)?),
            None => Ok(0),
        }
    }

    /// Overwrite an account's balance unconditionally
    ///
    /// This layer performs no arithmetic; the transaction engine computes
    /// new balances and writes them.
    pub fn set_balance(&self, account: &AccountId, value: u64) -> Result<()> {
        let cf = self.cf_handle(CF_BALANCES)?;
        let encoded = bincode::serialize(&value)?;

        self.db.put_cf(&cf, account.as_str().as_bytes(), &encoded)?;

        tracing::debug!(account = %account, balance = value, "Balance written");

        Ok(())
    }

    // Sold-item registry

    /// Record a sale; write-once per item
    pub fn record_sale(&self, item_id: Uuid, buyer: &AccountId) -> Result<()> {
        let cf = self.cf_handle(CF_SOLD_ITEMS)?;
        let key = item_id.as_bytes();

        if self.db.get_cf(&cf, key)?.is_some() {
            return Err(Error::Conflict(format!(
                "item {} already has a sale record",
                item_id
            )));
        }

        let value = bincode::serialize(buyer)?;
        self.db.put_cf(&cf, key, &value)?;

        tracing::debug!(item_id = %item_id, buyer = %buyer, "Sale recorded");

        Ok(())
    }

    /// Whether a sale record exists for this item
    pub fn is_sold(&self, item_id: Uuid) -> Result<bool> {
        let cf = self.cf_handle(CF_SOLD_ITEMS)?;
        Ok(self.db.get_cf(&cf, item_id.as_bytes())?.is_some())
    }

    /// Buyer recorded for a sold item, if any
    pub fn buyer_of(&self, item_id: Uuid) -> Result<Option<AccountId>> {
        let cf = self.cf_handle(CF_SOLD_ITEMS)?;

        match self.db.get_cf(&cf, item_id.as_bytes())? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    // Review ledger

    /// Store a review
    pub fn put_review(&self, review: &Review) -> Result<()> {
        let cf = self.cf_handle(CF_REVIEWS)?;
        let key = review.id.as_bytes();
        let value = bincode::serialize(review)?;

        self.db.put_cf(&cf, key, &value)?;

        tracing::debug!(
            review_id = %review.id,
            item_id = %review.item_id,
            "Review stored"
        );

        Ok(())
    }

    /// Get review by ID
    pub fn get_review(&self, id: Uuid) -> Result<Review> {
        let cf = self.cf_handle(CF_REVIEWS)?;

        let value = self
            .db
            .get_cf(&cf, id.as_bytes())?
            .ok_or_else(|| Error::NotFound(format!("no review with id {}", id)))?;

        let review: Review = bincode::deserialize(&value)?;
        Ok(review)
    }

    /// All recorded reviews (order irrelevant)
    pub fn reviews(&self) -> Result<Vec<Review>> {
        let cf = self.cf_handle(CF_REVIEWS)?;

        let mut reviews = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = item?;
            reviews.push(bincode::deserialize(&value)?);
        }

        Ok(reviews)
    }

    // Statistics

    /// Get storage statistics
    pub fn get_stats(&self) -> Result<StorageStats> {
        Ok(StorageStats {
            total_listings: self.count_cf(CF_LISTINGS)?,
            total_accounts: self.count_cf(CF_BALANCES)?,
            total_sold_items: self.count_cf(CF_SOLD_ITEMS)?,
            total_reviews: self.count_cf(CF_REVIEWS)?,
        })
    }

    fn count_cf(&self, name: &str) -> Result<u64> {
        let cf = self.cf_handle(name)?;

        let mut count = 0u64;
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            item?;
            count += 1;
        }

        Ok(count)
    }

    /// Close database (graceful shutdown)
    pub fn close(self) -> Result<()> {
        drop(self.db);
        tracing::info!("RocksDB closed gracefully");
        Ok(())
    }
}

/// Storage statistics
#[derive(Debug, Clone)]
pub struct StorageStats {
    /// Number of active listings
    pub total_listings: u64,
    /// Number of accounts with a balance entry
    pub total_accounts: u64,
    /// Number of sold-item records
    pub total_sold_items: u64,
    /// Number of stored reviews
    pub total_reviews: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BusinessProfile;
    use chrono::Utc;
    use tempfile::TempDir;

    fn test_config() -> (Config, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();
        (config, temp_dir)
    }

    fn test_listing(seller: &str, price: u64) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            business: BusinessProfile {
                name: "Harbor Goods".to_string(),
                product: "crated widget".to_string(),
                label: "general goods".to_string(),
                price,
                location: "Pier 4".to_string(),
                country: "Finland".to_string(),
                continent: "Europe".to_string(),
                zipcode: "00100".to_string(),
                description: "a widget in a crate".to_string(),
            },
            seller: AccountId::new(seller),
            listed_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_storage_open() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();
        assert!(storage.db.cf_handle(CF_LISTINGS).is_some());
        assert!(storage.db.cf_handle(CF_BALANCES).is_some());
        assert!(storage.db.cf_handle(CF_SOLD_ITEMS).is_some());
        assert!(storage.db.cf_handle(CF_REVIEWS).is_some());
    }

    #[test]
    fn test_listing_roundtrip() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();

        let listing = test_listing("seller-1", 100);
        storage.put_listing(&listing).unwrap();

        let retrieved = storage.get_listing(listing.id).unwrap();
        assert_eq!(retrieved, listing);

        let all = storage.listings().unwrap();
        assert_eq!(all.len(), 1);

        let removed = storage.remove_listing(listing.id).unwrap();
        assert_eq!(removed.id, listing.id);

        let result = storage.get_listing(listing.id);
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(storage.listings().unwrap().is_empty());
    }

    #[test]
    fn test_remove_absent_listing_is_not_found() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();

        let result = storage.remove_listing(Uuid::new_v4());
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_absent_balance_reads_as_zero() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();

        let account = AccountId::new("nobody");
        assert_eq!(storage.balance_of(&account).unwrap(), 0);
    }

    #[test]
    fn test_set_balance_overwrites() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();

        let account = AccountId::new("buyer-1");
        storage.set_balance(&account, 150).unwrap();
        assert_eq!(storage.balance_of(&account).unwrap(), 150);

        storage.set_balance(&account, 50).unwrap();
        assert_eq!(storage.balance_of(&account).unwrap(), 50);
    }

    #[test]
    fn test_record_sale_is_write_once() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();

        let item_id = Uuid::new_v4();
        let buyer = AccountId::new("buyer-1");

        assert!(!storage.is_sold(item_id).unwrap());
        storage.record_sale(item_id, &buyer).unwrap();

        assert!(storage.is_sold(item_id).unwrap());
        assert_eq!(storage.buyer_of(item_id).unwrap(), Some(buyer.clone()));

        let second = storage.record_sale(item_id, &AccountId::new("buyer-2"));
        assert!(matches!(second, Err(Error::Conflict(_))));

        // First record untouched
        assert_eq!(storage.buyer_of(item_id).unwrap(), Some(buyer));
    }

    #[test]
    fn test_review_roundtrip() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();

        let review = Review {
            id: Uuid::new_v4(),
            seller: AccountId::new("seller-1"),
            item_id: Uuid::new_v4(),
            reviewer: AccountId::new("buyer-1"),
            comment: "great".to_string(),
            rating: 5,
            created_at: Utc::now(),
        };

        storage.put_review(&review).unwrap();

        let retrieved = storage.get_review(review.id).unwrap();
        assert_eq!(retrieved, review);
        assert_eq!(storage.reviews().unwrap().len(), 1);
    }

    #[test]
    fn test_stats_counts() {
        let (config, _temp) = test_config();
        let storage = Storage::open(&config).unwrap();

        storage.put_listing(&test_listing("seller-1", 10)).unwrap();
        storage.put_listing(&test_listing("seller-2", 20)).unwrap();
        storage.set_balance(&AccountId::new("buyer-1"), 100).unwrap();
        storage
            .record_sale(Uuid::new_v4(), &AccountId::new("buyer-1"))
            .unwrap();

        let stats = storage.get_stats().unwrap();
        assert_eq!(stats.total_listings, 2);
        assert_eq!(stats.total_accounts, 1);
        assert_eq!(stats.total_sold_items, 1);
        assert_eq!(stats.total_reviews, 0);
    }
}
