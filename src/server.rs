//! HTTP server lifecycle
//!
//! Binds the listener, runs backend warmup next to it and turns an exhausted
//! warmup into a failed exit.

use actix_web::{rt, web, App, HttpServer};
use log::{error, info};
use std::io;
use std::sync::Arc;

use crate::api;
use crate::app_state::AppState;
use crate::service::WarmupState;

/// Serve until the server is stopped.
///
/// Returns an error when warmup ran out of attempts, so the process exits
/// with a failure status instead of looking like a clean shutdown.
pub async fn serve(state: AppState) -> io::Result<()> {
    let server_config = state.config.server.clone();
    let worker = state.warmup_worker();
    let status = Arc::clone(&state.warmup_status);
    let data = web::Data::new(state);

    info!("Starting server on {}:{}", server_config.host, server_config.port);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(data.clone())
            .configure(api::configure)
    })
    .workers(server_config.workers)
    .bind((server_config.host.as_str(), server_config.port))?
    .run();

    // Retry backend initialization without holding up the listener
    let handle = server.handle();
    let warmup = rt::spawn(async move {
        let outcome = worker.run().await;
        if let Err(e) = &outcome {
            error!("{}, shutting down", e);
            handle.stop(false).await;
        }
        outcome
    });

    server.await?;

    match status.state() {
        WarmupState::Failed => match warmup.await {
            Ok(Err(e)) => Err(io::Error::other(e)),
            _ => Err(io::Error::other("backend warmup failed")),
        },
        WarmupState::Ready | WarmupState::Retrying => {
            warmup.abort();
            Ok(())
        }
    }
}
