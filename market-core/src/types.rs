//! Core types for the marketplace
//!
//! All types are designed for:
//! - Deterministic serialization (bincode)
//! - Memory safety (no unsafe code)
//! - Exact arithmetic (u64 token amounts, checked operations)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Account identifier (opaque caller principal)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create new account ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the identifier carries no value
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Business details attached to a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessProfile {
    /// Business name
    pub name: String,

    /// Name of the item being sold
    pub product: String,

    /// Product label
    pub label: String,

    /// Asking price in tokens
    pub price: u64,

    /// Street-level location
    pub location: String,

    /// Country
    pub country: String,

    /// Continent
    pub continent: String,

    /// Postal code
    pub zipcode: String,

    /// Free-form description
    pub description: String,
}

/// An active, purchasable product entry owned by a seller account
///
/// A listing is owned exclusively by the listing store until purchase or
/// seller-initiated deletion removes it. A listing id is never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Unique listing ID
    pub id: Uuid,

    /// Business and product details
    pub business: BusinessProfile,

    /// Account that listed the product
    pub seller: AccountId,

    /// Listing timestamp
    pub listed_at: DateTime<Utc>,

    /// Last update timestamp (none until edited)
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingPayload {
    /// Business name
    pub name: String,

    /// Street-level location
    pub location: String,

    /// Postal code
    pub zipcode: String,

    /// Continent
    pub continent: String,

    /// Country
    pub country: String,

    /// Product label
    pub label: String,

    /// Asking price in tokens
    pub price: u64,

    /// Name of the item being sold
    pub product: String,

    /// Free-form description
    pub description: String,
}

impl ListingPayload {
    /// Names of required fields that carry no value
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_empty() {
            missing.push("business name");
        }
        if self.location.is_empty() {
            missing.push("location");
        }
        if self.zipcode.is_empty() {
            missing.push("zipcode");
        }
        if self.continent.is_empty() {
            missing.push("continent");
        }
        if self.country.is_empty() {
            missing.push("country");
        }
        if self.label.is_empty() {
            missing.push("product label");
        }
        if self.product.is_empty() {
            missing.push("item name");
        }
        if self.description.is_empty() {
            missing.push("description");
        }
        missing
    }
}

/// Buyer-authored feedback tied to a sold item
///
/// Immutable after creation; many reviews may reference the same item id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Unique review ID
    pub id: Uuid,

    /// Seller the review is addressed to
    pub seller: AccountId,

    /// Item the review refers to
    pub item_id: Uuid,

    /// Account that wrote the review
    pub reviewer: AccountId,

    /// Comment text
    pub comment: String,

    /// Numeric rating
    pub rating: u64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Payload for recording a review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewPayload {
    /// Seller the review is addressed to
    pub seller: AccountId,

    /// Item the review refers to
    pub item_id: Uuid,

    /// Comment text
    pub comment: String,

    /// Numeric rating
    pub rating: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> ListingPayload {
        ListingPayload {
            name: "Harbor Goods".to_string(),
            location: "Pier 4".to_string(),
            zipcode: "00100".to_string(),
            continent: "Europe".to_string(),
            country: "Finland".to_string(),
            label: "general goods".to_string(),
            price: 100,
            product: "crated widget".to_string(),
            description: "a widget in a crate".to_string(),
        }
    }

    #[test]
    fn test_account_id_display() {
        let account = AccountId::new("buyer-1");
        assert_eq!(account.as_str(), "buyer-1");
        assert_eq!(account.to_string(), "buyer-1");
        assert!(!account.is_empty());
        assert!(AccountId::new("").is_empty());
    }

    #[test]
    fn test_payload_complete() {
        assert!(full_payload().missing_fields().is_empty());
    }

    #[test]
    fn test_payload_missing_fields_collected_in_order() {
        let mut payload = full_payload();
        payload.name.clear();
        payload.continent.clear();
        payload.description.clear();

        assert_eq!(
            payload.missing_fields(),
            vec!["business name", "continent", "description"]
        );
    }
}
