// web-server/src/main.rs
use actix_web::{middleware::Logger, App, HttpServer};
use common::store::open_message_log;
use common::{setup_tracing, Config, PasswordHasher, TokenService};
use web_server::{cors, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = setup_tracing("info") {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    let config = Config::from_env();

    if config.uses_default_secret() {
        tracing::warn!("Signing tokens with the default secret; set APP__JWT__SECRET");
    }

    let message_log = open_message_log(&config.chat)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let state = AppState::new(
        TokenService::from_config(&config.jwt),
        PasswordHasher::new(config.password.bcrypt_cost),
        message_log,
    );

    let server_addr = config.server_addr.clone();
    let allowed_origins = config.cors.allowed_origins.clone();

    tracing::info!("Starting server on {}", server_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&allowed_origins))
            .wrap(Logger::default())
            .configure(|cfg| state.configure(cfg))
    })
    .bind(&server_addr)?
    .run()
    .await
}
