use mongodb::bson::doc;
use mongodb::options::{ClientOptions, ServerApi, ServerApiVersion};
use mongodb::Client;

/// Builds the shared client handle: stable server API V1 in strict mode,
/// then a startup ping against `admin`.
pub async fn setup_mongo(uri: &str) -> mongodb::error::Result<Client> {
    let mut client_options = ClientOptions::parse(uri).await?;
    client_options.app_name = Some("smart-deals-api".to_string());
    client_options.server_api = Some(
        ServerApi::builder()
            .version(ServerApiVersion::V1)
            .strict(true)
            .deprecation_errors(true)
            .build(),
    );

    let client = Client::with_options(client_options)?;
    client
        .database("admin")
        .run_command(doc! { "ping": 1 }, None)
        .await?;
    tracing::info!("pinged the deployment, connected to MongoDB");

    Ok(client)
}
