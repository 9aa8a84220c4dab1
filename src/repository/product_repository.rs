use futures::stream::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};
use mongodb::error::Result;
use mongodb::options::FindOptions;
use mongodb::results::{DeleteResult, InsertOneResult, UpdateResult};
use mongodb::{Client, Collection};

use crate::models::product::Product;

/// Fixed cap on the recency listing.
const LATEST_PRODUCTS_LIMIT: i64 = 6;

pub struct ProductRepository {
    collection: Collection<Product>,
}

impl ProductRepository {
    pub fn new(client: &Client, database: &str) -> Self {
        let db = client.database(database);
        let collection = db.collection::<Product>("products"); // Koleksiyon adı
        ProductRepository { collection }
    }

    pub async fn insert_product(&self, product: Product) -> Result<InsertOneResult> {
        self.collection.insert_one(product, None).await
    }

    pub async fn get_all_products(&self) -> Result<Vec<Product>> {
        let mut cursor = self.collection.find(None, None).await?;
        let mut products = Vec::new();
        while let Some(product) = cursor.try_next().await? {
            products.push(product);
        }
        Ok(products)
    }

    /// Newest first by `created_at`, capped at six documents.
    pub async fn get_latest_products(&self) -> Result<Vec<Product>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .limit(LATEST_PRODUCTS_LIMIT)
            .build();
        let mut cursor = self.collection.find(None, options).await?;
        let mut products = Vec::new();
        while let Some(product) = cursor.try_next().await? {
            products.push(product);
        }
        Ok(products)
    }

    pub async fn find_product_by_id(&self, id: ObjectId) -> Result<Option<Product>> {
        let filter = doc! { "_id": id };
        self.collection.find_one(filter, None).await
    }

    /// Whole-body `$set` merge; fields absent from `changes` are untouched
    /// and nothing is ever removed.
    pub async fn update_product(&self, id: ObjectId, changes: Document) -> Result<UpdateResult> {
        let query = doc! { "_id": id };
        let update = doc! { "$set": changes };
        self.collection.update_one(query, update, None).await
    }

    /// No existence check; the caller sees the raw delete count.
    pub async fn delete_product(&self, id: ObjectId) -> Result<DeleteResult> {
        let query = doc! { "_id": id };
        self.collection.delete_one(query, None).await
    }
}
