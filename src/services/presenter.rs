//! # Presenter Service
//!
//! End of the pipeline. `GetDisplayData` turns the Storage result into a
//! single user-facing message, and the public page renders that message as
//! HTML. The page always answers 200: failures are shown, not raised.

use askama::Template;
use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tracing::{debug, info};

use super::storage::StorageClient;
use crate::constants::{messages, methods, services};
use crate::error::PipelineResult;
use crate::logging::{log_error, log_service_operation, preview};
use crate::messages::DisplayResponse;
use crate::rpc::health::basic_health;
use crate::rpc::RpcReply;

pub struct PresenterService {
    storage: Arc<dyn StorageClient>,
}

impl std::fmt::Debug for PresenterService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenterService").finish_non_exhaustive()
    }
}

impl PresenterService {
    pub fn new(storage: Arc<dyn StorageClient>) -> Self {
        Self { storage }
    }

    /// Ask Storage for the analysis and phrase it for display
    pub async fn get_display_data(&self) -> PipelineResult<DisplayResponse> {
        let response = self.storage.get_data().await?;
        let message = if response.found {
            debug!(data = %preview(&response.data), "Data retrieved from storage");
            response.data
        } else {
            info!("Storage reported no data");
            messages::NO_DATA_FOUND.to_string()
        };
        Ok(DisplayResponse { message })
    }

    /// Message for the public page, never failing
    pub async fn page_message(&self) -> String {
        match self.get_display_data().await {
            Ok(response) => response.message,
            Err(e) => {
                log_error(services::PRESENTER, "page", &e.to_string(), Some(e.category()));
                messages::DISPLAY_ERROR.to_string()
            }
        }
    }
}

/// Router exposing `POST /rpc/GetDisplayData` and `GET /health`
pub fn rpc_router(service: Arc<PresenterService>) -> Router {
    Router::new()
        .route(
            &methods::route(methods::GET_DISPLAY_DATA),
            post(get_display_data_handler),
        )
        .route("/health", get(basic_health(services::PRESENTER)))
        .with_state(service)
}

/// Public router serving the results page on `GET /`
pub fn page_router(service: Arc<PresenterService>) -> Router {
    Router::new()
        .route("/", get(page_handler))
        .route("/health", get(basic_health(services::PRESENTER)))
        .with_state(service)
}

async fn get_display_data_handler(
    State(service): State<Arc<PresenterService>>,
) -> RpcReply<DisplayResponse> {
    log_service_operation(
        services::PRESENTER,
        methods::GET_DISPLAY_DATA,
        "received",
        None,
    );

    match service.get_display_data().await {
        Ok(response) => RpcReply::ok(response),
        Err(e) => {
            log_error(
                services::PRESENTER,
                methods::GET_DISPLAY_DATA,
                &e.to_string(),
                Some(e.category()),
            );
            RpcReply::failed(
                DisplayResponse {
                    message: messages::ERROR_OCCURRED.to_string(),
                },
                format!("Failed to get display data: {e}"),
            )
        }
    }
}

/// Public results page
#[derive(Template, Debug)]
#[template(path = "display.html")]
pub struct DisplayTemplate<'a> {
    pub message: &'a str,
}

async fn page_handler(State(service): State<Arc<PresenterService>>) -> Html<String> {
    let message = service.page_message().await;
    match render_page(&message) {
        Ok(page) => Html(page),
        Err(e) => {
            log_error(services::PRESENTER, "page", &e.to_string(), Some("template"));
            Html(messages::DISPLAY_ERROR.to_string())
        }
    }
}

pub fn render_page(message: &str) -> Result<String, askama::Error> {
    DisplayTemplate { message }.render()
}
