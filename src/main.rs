use log::info;
use std::env;
use std::io;

use todo_server::app_state::AppState;
use todo_server::config::AppConfig;
use todo_server::{logging, server};

#[actix_web::main]
async fn main() -> io::Result<()> {
    let log_config = env::var("LOG_CONFIG_FILE").unwrap_or_else(|_| logging::DEFAULT_LOG_CONFIG.to_string());
    logging::init(&log_config);

    let config = AppConfig::load().map_err(io::Error::other)?;
    info!("Version: {}", config.presentation.version);

    let state = AppState::from_config(config).map_err(io::Error::other)?;
    server::serve(state).await
}
