use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};

use crate::models::product::Product;
use crate::repository::product_repository::ProductRepository;

/// A bid document. `buyerEmail` drives the ownership filter on the bids
/// listing; `ProductId` is carried as a [`ProductRef`].
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Bid {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "buyerEmail", default, skip_serializing_if = "Option::is_none")]
    pub buyer_email: Option<String>,
    #[serde(rename = "ProductId", default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductRef>,
    #[serde(flatten)]
    pub fields: Document,
}

/// Weak reference to a product: the raw value the caller supplied, never
/// validated against the `products` collection. Filtering is plain equality
/// on that raw value; a lookup only succeeds when the value parses as an
/// ObjectId, so dangling and malformed references resolve to `None`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct ProductRef(pub Bson);

impl ProductRef {
    pub fn raw(&self) -> &Bson {
        &self.0
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    pub fn object_id(&self) -> Option<ObjectId> {
        self.0.as_str().and_then(|s| ObjectId::parse_str(s).ok())
    }

    pub async fn resolve(
        &self,
        products: &ProductRepository,
    ) -> mongodb::error::Result<Option<Product>> {
        match self.object_id() {
            Some(oid) => products.find_product_by_id(oid).await,
            None => Ok(None),
        }
    }
}

impl From<String> for ProductRef {
    fn from(raw: String) -> Self {
        ProductRef(Bson::String(raw))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn typed_attributes_are_lifted() {
        let bid: Bid = serde_json::from_value(json!({
            "buyerEmail": "buyer@example.com",
            "ProductId": "665c1f4e8f1b2a0001a1b2c3",
            "amount": 120
        }))
        .unwrap();

        assert_eq!(bid.buyer_email.as_deref(), Some("buyer@example.com"));
        assert_eq!(
            bid.product.as_ref().and_then(ProductRef::as_str),
            Some("665c1f4e8f1b2a0001a1b2c3")
        );
        assert_eq!(bid.fields.get_i64("amount").unwrap(), 120);
    }

    #[test]
    fn non_string_product_id_is_kept_raw() {
        // A numeric id is stored as-is and never matches the string filter
        // on the bids-by-product route.
        let bid: Bid = serde_json::from_value(json!({ "ProductId": 17 })).unwrap();
        let product = bid.product.unwrap();
        assert!(product.as_str().is_none());
        assert!(product.object_id().is_none());
    }

    #[test]
    fn object_id_resolves_only_for_valid_hex() {
        let valid = ProductRef::from("665c1f4e8f1b2a0001a1b2c3".to_string());
        assert!(valid.object_id().is_some());

        let dangling = ProductRef::from("definitely-not-an-object-id".to_string());
        assert!(dangling.object_id().is_none());
    }

    #[test]
    fn bid_round_trips_unchanged() {
        let body = json!({
            "buyerEmail": "buyer@example.com",
            "ProductId": "abc",
            "amount": 99.5,
            "note": "ön teklif"
        });
        let bid: Bid = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(serde_json::to_value(&bid).unwrap(), body);
    }
}
