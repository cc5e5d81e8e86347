use actix_web::{App, HttpServer, web};
use log::info;
use std::sync::Arc;

mod config;
mod elasticutils;
mod server;
mod tile;

use config::GatewayConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Arc::new(GatewayConfig::from_env());

    let elastic =
        Arc::new(elasticutils::connect(&config).expect("Failed to build Elasticsearch client"));

    info!("Tile server running on port {}", config.port);

    let port = config.port;

    HttpServer::new(move || {
        App::new()
            .wrap(server::default_headers())
            .app_data(web::Data::new(Arc::clone(&elastic)))
            .app_data(web::Data::new(Arc::clone(&config)))
            .configure(server::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
