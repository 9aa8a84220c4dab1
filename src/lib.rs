#[macro_use]
extern crate rocket;

pub mod config;
pub mod jwt;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;

use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::{Build, Request, Response, Rocket};
use rocket_db_pools::mongodb::Client;

use crate::config::app_config::{AppConfig, ServiceAccount};
use crate::repository::bid_repository::BidRepository;
use crate::repository::product_repository::ProductRepository;
use crate::repository::user_repository::UserRepository;
use crate::services::firebase_auth::FirebaseAuth;

// CORS fairing tanımı
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PATCH, DELETE, OPTIONS",
        ));
        response.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "Content-Type, Authorization",
        ));
    }
}

/// Assembles the rocket: repositories and the token verifier as managed
/// state, the auth policy from configuration, the gateway routes and the
/// catchers. The caller owns construction of the client handle.
pub fn build_rocket(
    config: &AppConfig,
    service_account: &ServiceAccount,
    client: &Client,
) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("port", config.port))
        .merge(("address", "0.0.0.0"));

    rocket::custom(figment)
        .manage(UserRepository::new(client, &config.database))
        .manage(ProductRepository::new(client, &config.database))
        .manage(BidRepository::new(client, &config.database))
        .manage(FirebaseAuth::new(service_account))
        .manage(config.auth_policy)
        .attach(Cors)
        .mount("/", routes::gateway_routes())
        .register("/", routes::gateway_catchers())
}
