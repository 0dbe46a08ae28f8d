//! Wishlist Operations

use std::sync::Arc;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::listing::repository::ListingRepository;
use crate::shared::error::{PlatformError, Result};
use crate::shared::ids::parse_object_id;
use super::entity::WishlistEntry;
use super::repository::WishlistRepository;

pub const DUPLICATE_WISHLIST_MESSAGE: &str = "Property already added to your wishlist";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToWishlistCommand {
    pub property_id: String,
}

/// Saves a listing to the caller's wishlist, once per listing.
pub struct AddToWishlistUseCase {
    listings: Arc<dyn ListingRepository>,
    wishlist: Arc<dyn WishlistRepository>,
}

impl AddToWishlistUseCase {
    pub fn new(listings: Arc<dyn ListingRepository>, wishlist: Arc<dyn WishlistRepository>) -> Self {
        Self { listings, wishlist }
    }

    pub async fn execute(&self, command: AddToWishlistCommand, buyer_email: &str) -> Result<WishlistEntry> {
        let listing_id = parse_object_id(&command.property_id)?;
        let listing = self.listings.find_by_id(&listing_id).await?
            .ok_or_else(|| PlatformError::not_found("Listing", command.property_id.clone()))?;

        let entry = WishlistEntry::new(&listing, buyer_email);
        if !self.wishlist.insert_unique(&entry).await? {
            return Err(PlatformError::duplicate("WishlistEntry", DUPLICATE_WISHLIST_MESSAGE));
        }

        info!(entry_id = %entry.id, listing_id = %entry.property_id, buyer = %entry.buyer_email, "Wishlist entry added");
        Ok(entry)
    }
}

pub struct RemoveFromWishlistUseCase {
    wishlist: Arc<dyn WishlistRepository>,
}

impl RemoveFromWishlistUseCase {
    pub fn new(wishlist: Arc<dyn WishlistRepository>) -> Self {
        Self { wishlist }
    }

    pub async fn execute(&self, id: &ObjectId, buyer_email: &str) -> Result<()> {
        let entry = self.wishlist.find_by_id(id).await?
            .ok_or_else(|| PlatformError::not_found("WishlistEntry", id.to_hex()))?;

        if !entry.buyer_email.eq_ignore_ascii_case(buyer_email.trim()) {
            return Err(PlatformError::forbidden("Only the owner can remove this wishlist entry"));
        }
        if !self.wishlist.delete(id).await? {
            return Err(PlatformError::not_found("WishlistEntry", id.to_hex()));
        }
        Ok(())
    }
}
