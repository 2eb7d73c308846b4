//! Transaction and validation layer
//!
//! Every function here runs inside the single-writer actor task, so a
//! sequence of storage calls executes without interleaving from other
//! requests. Validation always completes before the first write: a
//! `NotFound`, `Forbidden` or `BadRequest` returned from these functions
//! leaves every collection untouched.
//!
//! The purchase sequence is the one place where multiple keys are written
//! without a multi-key commit. Its write order is fixed: debit buyer,
//! credit seller, record sale, remove listing. A process crash between
//! those writes leaves a partial transfer that can be found by
//! cross-referencing balances against outstanding sold-item records; no
//! compensating rollback is attempted.

use crate::{
    error::{Error, Result},
    storage::Storage,
    types::{AccountId, BusinessProfile, Listing, ListingPayload, Review, ReviewPayload},
};
use chrono::Utc;
use uuid::Uuid;

/// Create a listing owned by the caller
///
/// Fails with `BadRequest` naming every required field the payload leaves
/// empty.
pub fn create_listing(
    storage: &Storage,
    payload: ListingPayload,
    caller: &AccountId,
) -> Result<Listing> {
    let missing = payload.missing_fields();
    if !missing.is_empty() {
        return Err(Error::BadRequest(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    let listing = Listing {
        id: Uuid::new_v4(),
        business: BusinessProfile {
            name: payload.name,
            product: payload.product,
            label: payload.label,
            price: payload.price,
            location: payload.location,
            country: payload.country,
            continent: payload.continent,
            zipcode: payload.zipcode,
            description: payload.description,
        },
        seller: caller.clone(),
        listed_at: Utc::now(),
        updated_at: None,
    };

    storage.put_listing(&listing)?;

    tracing::info!(
        listing_id = %listing.id,
        seller = %listing.seller,
        price = listing.business.price,
        "Listing created"
    );

    Ok(listing)
}

/// Delete a listing on behalf of its seller
///
/// Fails with `NotFound` when the listing is absent and `Forbidden` when
/// the caller is not the seller.
pub fn delete_listing(storage: &Storage, item_id: Uuid, caller: &AccountId) -> Result<Listing> {
    let listing = storage.get_listing(item_id)?;

    if listing.seller != *caller {
        return Err(Error::Forbidden(
            "only the seller can delete this listing".to_string(),
        ));
    }

    let removed = storage.remove_listing(item_id)?;

    tracing::info!(listing_id = %item_id, seller = %caller, "Listing deleted by seller");

    Ok(removed)
}

/// Execute a purchase, returning the pre-removal listing snapshot
///
/// The seller account is taken from the caller's request as-is; funds are
/// credited to that account, not to `listing.seller`.
///
/// Steps, in this exact order:
/// 1. listing lookup (`NotFound` if absent)
/// 2. self-purchase check (`Forbidden`)
/// 3. buyer balance check (`BadRequest` on insufficient tokens)
/// 4. seller balance read, credit overflow check
/// 5. debit buyer
/// 6. credit seller
/// 7. record sale
/// 8. remove listing
pub fn execute_buy(
    storage: &Storage,
    item_id: Uuid,
    seller: &AccountId,
    caller: &AccountId,
) -> Result<Listing> {
    let listing = storage.get_listing(item_id)?;

    if listing.seller == *caller {
        return Err(Error::Forbidden(
            "a seller cannot buy their own listing".to_string(),
        ));
    }

    let price = listing.business.price;

    let buyer_balance = storage.balance_of(caller)?;
    if price > buyer_balance {
        return Err(Error::BadRequest(
            "insufficient tokens to complete the purchase".to_string(),
        ));
    }

    let seller_balance = storage.balance_of(seller)?;
    let credited = seller_balance.checked_add(price).ok_or_else(|| {
        Error::BadRequest("seller balance would overflow".to_string())
    })?;

    // Last failure point above. From here on every write commits
    // individually; the order debit -> credit -> sale record -> removal
    // keeps any partial prefix auditable.
    storage.set_balance(caller, buyer_balance - price)?;
    storage.set_balance(seller, credited)?;
    storage.record_sale(item_id, caller)?;
    storage.remove_listing(item_id)?;

    tracing::info!(
        item_id = %item_id,
        buyer = %caller,
        seller = %seller,
        price,
        "Purchase complete"
    );

    Ok(listing)
}

/// Record a buyer review against a sold item
///
/// Field checks run in order, each failing with `BadRequest` naming the
/// missing field; the item must have a sale record. The reviewer is not
/// required to be the recorded buyer.
pub fn add_review(
    storage: &Storage,
    payload: ReviewPayload,
    reviewer: &AccountId,
) -> Result<Review> {
    if payload.seller.is_empty() {
        return Err(Error::BadRequest("seller id is missing".to_string()));
    }
    if payload.item_id.is_nil() {
        return Err(Error::BadRequest("item id is missing".to_string()));
    }
    if payload.comment.is_empty() {
        return Err(Error::BadRequest("comment is missing".to_string()));
    }
    if payload.rating == 0 {
        return Err(Error::BadRequest("rating is missing".to_string()));
    }

    if !storage.is_sold(payload.item_id)? {
        return Err(Error::BadRequest(
            "item with that id has not been sold".to_string(),
        ));
    }

    let review = Review {
        id: Uuid::new_v4(),
        seller: payload.seller,
        item_id: payload.item_id,
        reviewer: reviewer.clone(),
        comment: payload.comment,
        rating: payload.rating,
        created_at: Utc::now(),
    };

    storage.put_review(&review)?;

    tracing::info!(
        review_id = %review.id,
        item_id = %review.item_id,
        reviewer = %review.reviewer,
        "Review recorded"
    );

    Ok(review)
}
