//! HTTP API surface for lead-sleuth.

use crate::hunter::LeadHunter;
use crate::locale;
use crate::models::HuntReport;
use crate::processor::process_request;
use crate::store::JsonLeadStore;
use crate::{error::AppError, models::HuntRequest, strategy};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use warp::{Filter, Rejection, Reply, http::StatusCode};

/// API response structure.
#[derive(Serialize)]
struct ApiResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<HuntReport>,
}

/// Hunt request body: the pipeline request plus the user the dedup lookup
/// and persistence are scoped to.
#[derive(Deserialize)]
struct HuntApiRequest {
    #[serde(flatten)]
    request: HuntRequest,
    #[serde(default = "default_user")]
    user: String,
}

fn default_user() -> String {
    "default".to_string()
}

/// Start the API server.
pub(crate) async fn start_api_server(
    port: u16,
    hunter: Arc<LeadHunter>,
    store: Arc<Mutex<JsonLeadStore>>,
) -> anyhow::Result<()> {
    let hunter_filter = warp::any().map(move || hunter.clone());
    let store_filter = warp::any().map(move || store.clone());

    // Limit concurrent hunts; each one fans out into network calls.
    let semaphore = Arc::new(Semaphore::new(4));
    let semaphore_filter = warp::any().map(move || semaphore.clone());

    let health = warp::path("health").and(warp::get()).map(|| {
        warp::reply::json(&ApiResponse {
            success: true,
            message: "Lead Sleuth API is running".to_string(),
            report: None,
        })
    });

    let hunt = warp::path("hunt")
        .and(warp::post())
        .and(warp::body::json())
        .and(hunter_filter)
        .and(store_filter)
        .and(semaphore_filter)
        .and_then(handle_hunt);

    let strategies = warp::path("strategies")
        .and(warp::get())
        .map(|| warp::reply::json(&strategy::available_strategies()));

    let countries = warp::path("countries")
        .and(warp::get())
        .map(|| warp::reply::json(&locale::available_countries()));

    let routes = health
        .or(hunt)
        .or(strategies)
        .or(countries)
        .with(warp::cors().allow_any_origin());

    tracing::info!("Starting API server on port {}", port);
    warp::serve(routes).run(([0, 0, 0, 0], port)).await;

    Ok(())
}

/// Handle a single hunt request.
async fn handle_hunt(
    body: HuntApiRequest,
    hunter: Arc<LeadHunter>,
    store: Arc<Mutex<JsonLeadStore>>,
    semaphore: Arc<Semaphore>,
) -> Result<impl Reply, Rejection> {
    let permit = semaphore.acquire().await;
    if permit.is_err() {
        return Ok(warp::reply::with_status(
            warp::reply::json(&ApiResponse {
                success: false,
                message: "Server shutting down".to_string(),
                report: None,
            }),
            StatusCode::SERVICE_UNAVAILABLE,
        ));
    }

    tracing::info!("Processing hunt request for user '{}'", body.user);
    match process_request(hunter, store, &body.user, body.request).await {
        Ok(report) => Ok(warp::reply::with_status(
            warp::reply::json(&ApiResponse {
                success: true,
                message: format!("Found {} leads", report.lead_count),
                report: Some(report),
            }),
            StatusCode::OK,
        )),
        Err(AppError::InvalidRequest(message)) => Ok(warp::reply::with_status(
            warp::reply::json(&ApiResponse {
                success: false,
                message,
                report: None,
            }),
            StatusCode::BAD_REQUEST,
        )),
        Err(e) => {
            tracing::error!("Hunt processing failed: {}", e);
            Ok(warp::reply::with_status(
                warp::reply::json(&ApiResponse {
                    success: false,
                    message: "Internal error".to_string(),
                    report: None,
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}
