//! MongoDB Index Initialization
//!
//! Creates indexes for all collections on application startup. The unique
//! compound indexes back the one-offer and one-wishlist-entry per
//! (listing, buyer) rule; `payments.boughtId` is unique per offer.

use mongodb::{Database, IndexModel, bson::doc, options::IndexOptions};
use tracing::info;

use crate::listing::repository::LISTINGS_COLLECTION;
use crate::offer::repository::OFFERS_COLLECTION;
use crate::payment::repository::PAYMENTS_COLLECTION;
use crate::review::repository::REVIEWS_COLLECTION;
use crate::user::repository::USERS_COLLECTION;
use crate::wishlist::repository::WISHLIST_COLLECTION;

/// Initialize all MongoDB indexes
pub async fn initialize_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    info!("Initializing MongoDB indexes...");

    create_user_indexes(db).await?;
    create_listing_indexes(db).await?;
    create_offer_indexes(db).await?;
    create_wishlist_indexes(db).await?;
    create_misc_indexes(db).await?;

    info!("MongoDB indexes initialized successfully");
    Ok(())
}

fn unique() -> IndexOptions {
    IndexOptions::builder().unique(true).background(true).build()
}

fn background() -> IndexOptions {
    IndexOptions::builder().background(true).build()
}

async fn create_user_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<mongodb::bson::Document>(USERS_COLLECTION);

    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(unique())
            .build(),
    ).await?;

    // Public agent directory, newest first
    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "role": 1, "date": -1 })
            .options(background())
            .build(),
    ).await?;

    Ok(())
}

async fn create_listing_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<mongodb::bson::Document>(LISTINGS_COLLECTION);

    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "agentEmail": 1 })
            .options(background())
            .build(),
    ).await?;

    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "status": 1, "advertise": 1 })
            .options(background())
            .build(),
    ).await?;

    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "minimumPrice": 1, "maximumPrice": 1 })
            .options(background())
            .build(),
    ).await?;

    Ok(())
}

async fn create_offer_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<mongodb::bson::Document>(OFFERS_COLLECTION);

    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "propertyId": 1, "buyerEmail": 1 })
            .options(unique())
            .build(),
    ).await?;

    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "agentEmail": 1, "createdAt": -1 })
            .options(background())
            .build(),
    ).await?;

    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "buyerEmail": 1, "createdAt": -1 })
            .options(background())
            .build(),
    ).await?;

    Ok(())
}

async fn create_wishlist_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<mongodb::bson::Document>(WISHLIST_COLLECTION);

    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "propertyId": 1, "buyerEmail": 1 })
            .options(unique())
            .build(),
    ).await?;

    Ok(())
}

async fn create_misc_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    db.collection::<mongodb::bson::Document>(REVIEWS_COLLECTION)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "propertyId": 1, "date": -1 })
                .options(background())
                .build(),
        ).await?;

    db.collection::<mongodb::bson::Document>(REVIEWS_COLLECTION)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "email": 1, "date": -1 })
                .options(background())
                .build(),
        ).await?;

    // One payment per settled offer.
    db.collection::<mongodb::bson::Document>(PAYMENTS_COLLECTION)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "boughtId": 1 })
                .options(unique())
                .build(),
        ).await?;

    db.collection::<mongodb::bson::Document>(PAYMENTS_COLLECTION)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "agentEmail": 1, "date": -1 })
                .options(background())
                .build(),
        ).await?;

    Ok(())
}
