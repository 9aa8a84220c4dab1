use mongodb::bson::oid::ObjectId;
use mongodb::bson::Document;
use serde::{Deserialize, Serialize};

/// A product document. Only the id is typed; `created_at` and the seller
/// reference live in `fields` along with whatever else the caller sent.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Product {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(flatten)]
    pub fields: Document,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn arbitrary_body_round_trips_unchanged() {
        let body = json!({
            "title": "Lamp",
            "price": 42,
            "created_at": "2024-05-01T10:00:00Z",
            "seller": "seller@example.com"
        });
        let product: Product = serde_json::from_value(body.clone()).unwrap();
        assert!(product.id.is_none());
        assert_eq!(serde_json::to_value(&product).unwrap(), body);
    }

    #[test]
    fn stored_id_is_kept_under_underscore_id() {
        let oid = ObjectId::new();
        let product = Product {
            id: Some(oid),
            fields: Document::new(),
        };
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["_id"]["$oid"], json!(oid.to_hex()));
    }
}
