//! HTTP server setup and route handlers for the paid-user dashboard.
//!
//! Four route groups gated behind basic auth (the landing page, the user
//! table, and the add/remove form-plus-action pairs) and an open health
//! endpoint. HTML pages live in [`crate::ui`]; the JSON actions live here.

use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::auth;
use crate::config::UserConfig;
use crate::provider::ProviderClient;
use crate::state::AppState;
use crate::types::{ActionResponse, HealthResponse, UserSelector};
use crate::ui;
use crate::users;
use crate::validation;

/// JSON body accepted by the add/remove actions.
#[derive(Debug, Deserialize)]
struct EmailPayload {
    email: Option<String>,
}

/// Run the dashboard server in the foreground.
pub async fn run_server(host: String, port: u16, config: UserConfig) -> Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "Starting paid-admin dashboard");

    let host = validation::validate_hostname(&host)
        .map_err(|e| anyhow::anyhow!("Invalid host parameter: {e}"))?;
    let port = validation::validate_port(port)
        .map_err(|e| anyhow::anyhow!("Invalid port parameter: {e}"))?;

    let provider = ProviderClient::from_user_config(&config)?;
    let state = AppState::new(provider, config);
    let app = app_router(state);

    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        error!(addr = %addr, error = %e, "Failed to bind to address");
        anyhow::anyhow!("Failed to bind to {addr}: {e}")
    })?;

    println!("✅ Dashboard is running on http://{addr}");
    println!("   Users:  http://{addr}/users/index");
    println!("   Health: http://{addr}/health");

    info!(addr = %addr, "Server listening");
    axum::serve(listener, app).await.map_err(|e| {
        error!(error = %e, "Server error");
        anyhow::anyhow!("Server error: {e}")
    })?;

    Ok(())
}

/// Build the dashboard router. Exposed separately so tests can mount it
/// without binding a socket.
pub fn app_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/", get(ui::index_page))
        .route("/users/index", get(ui::users_page))
        .route("/users/create", get(ui::create_page).post(create_paid_user))
        .route("/users/delete", get(ui::delete_page).post(delete_paid_user))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint (unauthenticated, for probes).
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

/// Mark the user with the posted email as paid.
async fn create_paid_user(
    State(state): State<AppState>,
    payload: Result<Json<EmailPayload>, JsonRejection>,
) -> Response {
    apply_paid_action(state, payload, true).await
}

/// Unmark the user with the posted email.
async fn delete_paid_user(
    State(state): State<AppState>,
    payload: Result<Json<EmailPayload>, JsonRejection>,
) -> Response {
    apply_paid_action(state, payload, false).await
}

/// Shared body of the two JSON actions.
///
/// Contract: malformed JSON is a 400; a missing or invalid email and any
/// provider failure are reported as 200 with `success: false`, so the form
/// can surface the message inline.
async fn apply_paid_action(
    state: AppState,
    payload: Result<Json<EmailPayload>, JsonRejection>,
    mark_paid: bool,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected malformed action payload");
            return (
                StatusCode::BAD_REQUEST,
                Json(ActionResponse::failure(rejection.body_text())),
            )
                .into_response();
        }
    };

    let email = match payload.email.as_deref().map(validation::validate_email) {
        Some(Ok(email)) => email,
        _ => {
            return Json(ActionResponse::failure(
                "Please enter a valid email address",
            ))
            .into_response()
        }
    };

    let selector = UserSelector::Email(email);
    let outcome = if mark_paid {
        users::add_paid_user(&state.provider, &selector).await
    } else {
        users::remove_paid_user(&state.provider, &selector).await
    };

    match outcome {
        Ok(account) => {
            info!(uid = %account.local_id, is_paid = %mark_paid, "Paid state updated via dashboard");
            let message = if mark_paid {
                "Successfully added user"
            } else {
                "Successfully removed user"
            };
            Json(ActionResponse::success(message)).into_response()
        }
        Err(e) => {
            warn!(selector = %selector, error = %e, "Paid state update failed");
            Json(ActionResponse::failure(e.to_string())).into_response()
        }
    }
}
