//! # Paid User Admin
//!
//! A small administrative utility for toggling a "paid" flag on users managed
//! by a third-party identity + realtime-database service. It ships two
//! surfaces over one data-access layer:
//!
//! - **Web dashboard**: basic-auth-gated server-rendered pages for listing
//!   users and marking/unmarking them as paid via JSON actions.
//! - **CLI**: `users` / `show` / `add` / `remove` subcommands, plus `serve`
//!   to run the dashboard and `config` to manage settings.
//!
//! ## Key Modules
//!
//! - [`provider`]: REST client for the identity API and the realtime database
//! - [`users`]: the list/show/add/remove operations and the paid-flag merge
//! - [`server`] / [`ui`] / [`auth`]: the axum dashboard
//! - [`cli`] / [`client_ops`]: the command-line surface
//! - [`config`]: persistent user configuration with env overrides
//! - [`error`]: standardized errors and HTTP responses

// Module declarations
pub mod auth;
pub mod cli;
pub mod client_ops;
pub mod config;
pub mod error;
pub mod provider;
pub mod server;
pub mod state;
pub mod types;
pub mod ui;
pub mod users;
pub mod validation;

// Re-export key types for convenience
pub use config::UserConfig;
pub use error::{ApiErrorResponse, AppError, AppResult, ErrorCode};
pub use provider::{ProviderClient, ProviderConfig};
pub use server::{app_router, run_server};
pub use state::AppState;
pub use types::{
    ActionResponse, HealthResponse, PaidRecord, PaidRecordPatch, PaidUserDetail, UserSelector,
    UserView,
};
