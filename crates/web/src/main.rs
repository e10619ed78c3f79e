use database::{DatabaseConnectionInfo, SqliteDatabase};
use restrooms::{client::Client, images::ImageStore};
use web::{start_web_server, WebConfig, WebState};

#[tokio::main]
async fn main() {
    // a missing .env file is fine, the environment may be set otherwise
    let _ = dotenvy::dotenv();
    env_logger::init();

    // database
    let database_connection_info = DatabaseConnectionInfo::from_env()
        .expect("expected valid database connection info in env.");
    let database = SqliteDatabase::connect(database_connection_info)
        .await
        .expect("could not connect to database.");

    // images
    let config = WebConfig::from_env().expect("expected valid web config in env.");
    let images = ImageStore::new(config.upload_dir.clone());

    // web server
    let state = WebState {
        restroom_client: Client::new(database, images),
    };
    if let Err(why) = start_web_server(state, config).await {
        log::error!("web server stopped: {}", why);
    }
}
