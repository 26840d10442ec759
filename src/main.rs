use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;

use invoicedash::{
    config::Config, repository::PgRepository, routes, session::SessionGuard, AppState,
};

fn cors(allowed_origin: Option<&str>) -> Cors {
    match allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allowed_methods(vec!["GET", "POST", "DELETE"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::IF_NONE_MATCH])
            .expose_headers(vec![header::ETAG, header::LOCATION])
            .supports_credentials()
            .max_age(3600),
        None => Cors::default(),
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::ConnectionRefused, e))?;
    log::info!("Connected to database");

    let state = web::Data::new(AppState::from_config(
        Arc::new(PgRepository::new(pool)),
        &config,
    ));
    let codec = state.codec.clone();
    let allowed_origin = config.allowed_origin.clone();
    let debug_routes = config.debug_routes;
    if debug_routes {
        log::warn!("DEBUG_ROUTES is enabled: /query can list users and drop every table");
    }

    log::info!("Starting invoicedash at {}", config.server_url());
    HttpServer::new(move || {
        let mut app = App::new()
            .app_data(state.clone())
            .wrap(SessionGuard::new(codec.clone()))
            .wrap(cors(allowed_origin.as_deref()))
            .wrap(Logger::default())
            .configure(routes::config);
        if debug_routes {
            app = app.configure(routes::debug::config);
        }
        app
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
