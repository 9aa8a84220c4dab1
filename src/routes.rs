use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use mongodb::results::{DeleteResult, InsertOneResult, UpdateResult};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{Request, State};
use serde::{Deserialize, Serialize};

use crate::models::bid::{Bid, ProductRef};
use crate::models::product::Product;
use crate::models::user::User;
use crate::repository::bid_repository::BidRepository;
use crate::repository::product_repository::ProductRepository;
use crate::repository::user_repository::UserRepository;
use crate::services::auth_policy::MutationGate;
use crate::services::firebase_auth::AuthenticatedUser;

#[derive(Serialize, Deserialize, Debug)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    fn new(message: &str) -> Self {
        ApiMessage {
            message: message.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ApiError {
    pub error: String,
}

/// Driver acknowledgments, serialized with the camelCase field names
/// existing clients consume.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    pub inserted_id: Bson,
}

impl From<InsertOneResult> for InsertAck {
    fn from(result: InsertOneResult) -> Self {
        InsertAck {
            acknowledged: true,
            inserted_id: result.inserted_id,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl From<UpdateResult> for UpdateAck {
    fn from(result: UpdateResult) -> Self {
        UpdateAck {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl From<DeleteResult> for DeleteAck {
    fn from(result: DeleteResult) -> Self {
        DeleteAck {
            acknowledged: true,
            deleted_count: result.deleted_count,
        }
    }
}

#[derive(Responder, Debug)]
pub enum GatewayError {
    #[response(status = 403)]
    Forbidden(Json<ApiMessage>),
    #[response(status = 500)]
    Database(Json<ApiError>),
}

impl GatewayError {
    fn forbidden() -> Self {
        GatewayError::Forbidden(Json(ApiMessage::new("Forbidden access")))
    }

    fn database(error: mongodb::error::Error) -> Self {
        tracing::error!("database operation failed: {error}");
        GatewayError::Database(Json(ApiError {
            error: error.to_string(),
        }))
    }
}

/// Malformed ids surface as a 500 with the parse error, never a 404.
fn parse_object_id(id: &str) -> Result<ObjectId, GatewayError> {
    ObjectId::parse_str(id).map_err(|e| {
        tracing::error!(%id, "malformed product id: {e}");
        GatewayError::Database(Json(ApiError {
            error: e.to_string(),
        }))
    })
}

#[get("/")]
fn index() -> &'static str {
    "Smart deals service"
}

// CORS preflight
#[options("/<_..>")]
fn all_options() -> Status {
    Status::Ok
}

#[post("/user", format = "json", data = "<new_user>")]
async fn create_user(
    users: &State<UserRepository>,
    _gate: MutationGate,
    new_user: Json<User>,
) -> Result<(Status, Json<ApiMessage>), GatewayError> {
    let new_user = new_user.into_inner();
    // Check-then-insert, not atomic: two concurrent requests with the same
    // email can both insert.
    match users.find_user_by_email(new_user.email.as_deref()).await {
        Ok(Some(_)) => Ok((Status::Ok, Json(ApiMessage::new("User already exists")))),
        Ok(None) => match users.insert_user(new_user).await {
            Ok(_) => Ok((Status::Created, Json(ApiMessage::new("New user added")))),
            Err(e) => Err(GatewayError::database(e)),
        },
        Err(e) => Err(GatewayError::database(e)),
    }
}

#[post("/products", format = "json", data = "<new_product>")]
async fn create_product(
    products: &State<ProductRepository>,
    _gate: MutationGate,
    new_product: Json<Product>,
) -> Result<(Status, Json<InsertAck>), GatewayError> {
    match products.insert_product(new_product.into_inner()).await {
        Ok(result) => Ok((Status::Created, Json(result.into()))),
        Err(e) => Err(GatewayError::database(e)),
    }
}

#[get("/bids?<email>")]
async fn get_bids(
    bids: &State<BidRepository>,
    viewer: AuthenticatedUser,
    email: Option<String>,
) -> Result<Json<Vec<Bid>>, GatewayError> {
    // A supplied filter must match the verified identity; an absent or
    // empty filter leaves the listing unscoped.
    let email = email.filter(|e| !e.is_empty());
    if let Some(ref email) = email {
        if *email != viewer.email {
            return Err(GatewayError::forbidden());
        }
    }

    match bids.get_bids(email.as_deref()).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => Err(GatewayError::database(e)),
    }
}

#[post("/bids", format = "json", data = "<new_bid>")]
async fn create_bid(
    bids: &State<BidRepository>,
    _gate: MutationGate,
    new_bid: Json<Bid>,
) -> Result<(Status, Json<InsertAck>), GatewayError> {
    match bids.insert_bid(new_bid.into_inner()).await {
        Ok(result) => Ok((Status::Created, Json(result.into()))),
        Err(e) => Err(GatewayError::database(e)),
    }
}

#[get("/allproducts")]
async fn get_all_products(
    products: &State<ProductRepository>,
) -> Result<Json<Vec<Product>>, GatewayError> {
    match products.get_all_products().await {
        Ok(result) => Ok(Json(result)),
        Err(e) => Err(GatewayError::database(e)),
    }
}

#[get("/latest-products")]
async fn get_latest_products(
    products: &State<ProductRepository>,
) -> Result<Json<Vec<Product>>, GatewayError> {
    match products.get_latest_products().await {
        Ok(result) => Ok(Json(result)),
        Err(e) => Err(GatewayError::database(e)),
    }
}

#[get("/allproducts/<id>")]
async fn get_product(
    products: &State<ProductRepository>,
    id: String,
) -> Result<Json<Option<Product>>, GatewayError> {
    let id = parse_object_id(&id)?;
    match products.find_product_by_id(id).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => Err(GatewayError::database(e)),
    }
}

#[get("/allproducts/bids/<productid>")]
async fn get_product_bids(
    bids: &State<BidRepository>,
    productid: String,
) -> Result<Json<Vec<Bid>>, GatewayError> {
    let product = ProductRef::from(productid);
    match bids.find_bids_by_product(&product).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => Err(GatewayError::database(e)),
    }
}

#[patch("/allproducts/<id>", format = "json", data = "<changes>")]
async fn update_product(
    products: &State<ProductRepository>,
    _gate: MutationGate,
    id: String,
    changes: Json<Document>,
) -> Result<Json<UpdateAck>, GatewayError> {
    let id = parse_object_id(&id)?;
    match products.update_product(id, changes.into_inner()).await {
        Ok(result) => Ok(Json(result.into())),
        Err(e) => Err(GatewayError::database(e)),
    }
}

#[delete("/allproducts/<id>")]
async fn delete_product(
    products: &State<ProductRepository>,
    _gate: MutationGate,
    id: String,
) -> Result<Json<DeleteAck>, GatewayError> {
    let id = parse_object_id(&id)?;
    match products.delete_product(id).await {
        Ok(result) => Ok(Json(result.into())),
        Err(e) => Err(GatewayError::database(e)),
    }
}

#[catch(401)]
fn unauthorized() -> Json<ApiMessage> {
    Json(ApiMessage::new("Unauthorized access"))
}

#[catch(404)]
fn not_found(req: &Request) -> Json<ApiMessage> {
    Json(ApiMessage {
        message: format!("404: '{}' route not found", req.uri()),
    })
}

pub fn gateway_routes() -> Vec<rocket::Route> {
    routes![
        index,
        all_options,
        create_user,
        create_product,
        get_bids,
        create_bid,
        get_all_products,
        get_latest_products,
        get_product,
        get_product_bids,
        update_product,
        delete_product,
    ]
}

pub fn gateway_catchers() -> Vec<rocket::Catcher> {
    catchers![unauthorized, not_found]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn insert_ack_uses_driver_field_names() {
        let oid = ObjectId::new();
        let ack = InsertAck {
            acknowledged: true,
            inserted_id: Bson::ObjectId(oid),
        };
        let value = serde_json::to_value(&ack).unwrap();
        assert_eq!(value["acknowledged"], json!(true));
        assert_eq!(value["insertedId"]["$oid"], json!(oid.to_hex()));
    }

    #[test]
    fn update_ack_uses_driver_field_names() {
        let ack = UpdateAck {
            acknowledged: true,
            matched_count: 1,
            modified_count: 1,
        };
        let value = serde_json::to_value(&ack).unwrap();
        assert_eq!(
            value,
            json!({ "acknowledged": true, "matchedCount": 1, "modifiedCount": 1 })
        );
    }

    #[test]
    fn delete_ack_reports_zero_deletions_as_success() {
        let ack = DeleteAck {
            acknowledged: true,
            deleted_count: 0,
        };
        let value = serde_json::to_value(&ack).unwrap();
        assert_eq!(value, json!({ "acknowledged": true, "deletedCount": 0 }));
    }

    #[test]
    fn malformed_id_maps_to_the_error_body() {
        let err = parse_object_id("definitely-not-hex").unwrap_err();
        assert!(matches!(err, GatewayError::Database(_)));
    }
}
