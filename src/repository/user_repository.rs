use mongodb::bson::doc;
use mongodb::error::Result;
use mongodb::results::InsertOneResult;
use mongodb::{Client, Collection};

use crate::models::user::User;

pub struct UserRepository {
    collection: Collection<User>,
}

impl UserRepository {
    pub fn new(client: &Client, database: &str) -> Self {
        let db = client.database(database);
        let collection = db.collection::<User>("users"); // Koleksiyon adı
        UserRepository { collection }
    }

    /// Lookup by the application-level uniqueness key. A missing email
    /// matches documents whose email is null or absent.
    pub async fn find_user_by_email(&self, email: Option<&str>) -> Result<Option<User>> {
        let filter = doc! { "email": email };
        self.collection.find_one(filter, None).await
    }

    pub async fn insert_user(&self, user: User) -> Result<InsertOneResult> {
        self.collection.insert_one(user, None).await
    }
}
