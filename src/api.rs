//! HTTP endpoints for the todo list

use actix_web::error::InternalError;
use actix_web::http::header::{self, ContentType};
use actix_web::{delete, get, post, web, Error, HttpResponse};
use log::{error, info, warn};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::render;
use crate::storage::StoreError;

/// Form submitted by the page's add box
#[derive(Debug, Deserialize)]
pub struct NewTodo {
    #[serde(rename = "Item", default)]
    pub item: String,
}

/// Query string of the delete endpoint
#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub item: String,
}

/// Register every todo route plus the form error handling
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(form_config())
        .service(healthz)
        .service(list_todos)
        .service(create_todo)
        .service(delete_todo);
}

/// Malformed submissions get the parse error back as plain text
fn form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(|err, _req| {
        warn!("An error occurred while parsing a todo submission: {}", err);
        let response = HttpResponse::BadRequest()
            .content_type(ContentType::plaintext())
            .body(err.to_string());
        InternalError::from_response(err, response).into()
    })
}

/// Run synchronous logging with `item` in the MDC.
///
/// The MDC is thread-local and actix workers interleave requests on one
/// thread, so the key must never stay set across an `.await`.
fn with_item_mdc(item: &str, log: impl FnOnce()) {
    log_mdc::insert("item", item);
    log();
    log_mdc::remove("item");
}

fn log_store_failure(app_state: &AppState, action: &str, err: &StoreError) {
    error!("Failed to {}: {}", action, err);
    if !app_state.warmup_status.is_ready() {
        warn!(
            "Backend is not initialized yet (warmup {} after {} attempts)",
            app_state.warmup_status.state(),
            app_state.warmup_status.attempts()
        );
    }
}

/// Liveness/readiness probe
#[get("/healthz")]
pub async fn healthz(app_state: web::Data<AppState>) -> HttpResponse {
    match app_state.todo_service.healthcheck().await {
        Ok(()) => HttpResponse::Ok()
            .content_type(ContentType::plaintext())
            .body("ok"),
        Err(e) => {
            warn!("Healthcheck failed: {}", e);
            HttpResponse::ServiceUnavailable()
                .content_type(ContentType::plaintext())
                .body(e.to_string())
        }
    }
}

#[get("/")]
pub async fn list_todos(app_state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let page = app_state
        .todo_service
        .list()
        .await
        .inspect_err(|e| log_store_failure(&app_state, "list todos", e))?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(render::index_page(&page)))
}

/// Add a todo, then send the browser back to the list whether or not
/// anything was stored
#[post("/")]
pub async fn create_todo(
    form: web::Form<NewTodo>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let NewTodo { item } = form.into_inner();
    with_item_mdc(&item, || info!("Creating a new To Do: {:?}", item));

    app_state
        .todo_service
        .create(&item)
        .await
        .inspect_err(|e| with_item_mdc(&item, || log_store_failure(&app_state, "create todo", e)))?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .finish())
}

/// Delete every todo matching `?item=`. Answers `deleted` even when nothing matched.
#[delete("/delete")]
pub async fn delete_todo(
    query: web::Query<DeleteParams>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let DeleteParams { item } = query.into_inner();
    with_item_mdc(&item, || info!("Deleting To Do: {:?}", item));

    app_state
        .todo_service
        .delete(&item)
        .await
        .inspect_err(|e| with_item_mdc(&item, || log_store_failure(&app_state, "delete todo", e)))?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("deleted"))
}
