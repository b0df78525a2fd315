use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{web, App, HttpServer};
use log::info;

use biotech_analyzer::routes::{self, Endpoint};
use biotech_analyzer::ServerConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    let config = ServerConfig::from_env();
    let bind_address = config.bind_address();
    let limits = config.limits;

    info!("Starting biotech analyzer API");
    info!("Listening on http://{}", bind_address);
    info!("Workers: {}", config.workers);
    info!("Endpoints:");
    for endpoint in Endpoint::ALL {
        info!("   {:<4} {}", endpoint.method().as_str(), endpoint.path());
    }

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .wrap(routes::cors())
            .configure(routes::configure(limits))
            .default_service(web::route().to(routes::not_found))
    })
    .workers(config.workers)
    .bind(&bind_address)?
    .run()
    .await
}
