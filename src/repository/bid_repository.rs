use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::error::Result;
use mongodb::results::InsertOneResult;
use mongodb::{Client, Collection};

use crate::models::bid::{Bid, ProductRef};

pub struct BidRepository {
    collection: Collection<Bid>,
}

impl BidRepository {
    pub fn new(client: &Client, database: &str) -> Self {
        let db = client.database(database);
        let collection = db.collection::<Bid>("bids"); // Koleksiyon adı
        BidRepository { collection }
    }

    pub async fn insert_bid(&self, bid: Bid) -> Result<InsertOneResult> {
        self.collection.insert_one(bid, None).await
    }

    /// All bids, or only the given buyer's when a filter email is supplied.
    pub async fn get_bids(&self, buyer_email: Option<&str>) -> Result<Vec<Bid>> {
        let filter = buyer_email.map(|email| doc! { "buyerEmail": email });
        let mut cursor = self.collection.find(filter, None).await?;
        let mut bids = Vec::new();
        while let Some(bid) = cursor.try_next().await? {
            bids.push(bid);
        }
        Ok(bids)
    }

    /// Raw equality on the stored `ProductId` value; no coercion, so a bid
    /// whose reference was stored as anything but the exact string never
    /// matches.
    pub async fn find_bids_by_product(&self, product: &ProductRef) -> Result<Vec<Bid>> {
        let filter = doc! { "ProductId": product.raw().clone() };
        let mut cursor = self.collection.find(filter, None).await?;
        let mut bids = Vec::new();
        while let Some(bid) = cursor.try_next().await? {
            bids.push(bid);
        }
        Ok(bids)
    }
}
