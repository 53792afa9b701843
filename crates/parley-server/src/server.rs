use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing::info;

use crate::error::AppError;
use crate::handlers::{chat, session, usage};
use crate::state::AppState;

/// Register all routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(usage::root)).service(
        web::scope("/api/v1")
            .route("/message", web::post().to(chat::send_message))
            .route("/reset", web::post().to(session::reset_session))
            .route("/usage", web::get().to(usage::get_usage)),
    );
}

/// JSON extractor config reporting malformed bodies as 400 with an `error` field
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

pub async fn run_server(state: AppState, host: &str, port: u16) -> std::io::Result<()> {
    let data = web::Data::new(state);

    info!("Starting server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .app_data(json_config())
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind((host, port))?
    .run()
    .await
}
