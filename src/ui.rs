//! Server-rendered dashboard pages.

use askama::Template;
use axum::{extract::State, response::Html};
use tracing::error;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::types::UserView;
use crate::users;

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    version: String,
}

#[derive(Template)]
#[template(path = "users.html")]
struct UsersTemplate {
    users: Vec<UserView>,
    total: usize,
    paid_total: usize,
}

#[derive(Template)]
#[template(path = "user_create.html")]
struct CreateTemplate {}

#[derive(Template)]
#[template(path = "user_delete.html")]
struct DeleteTemplate {}

/// Render the dashboard landing page.
pub async fn index_page() -> AppResult<Html<String>> {
    render(IndexTemplate {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Render the user table: every identity account with its derived paid flag.
pub async fn users_page(State(state): State<AppState>) -> AppResult<Html<String>> {
    let users = users::list_users(&state.provider).await?;
    let paid_total = users.iter().filter(|user| user.is_paid).count();

    render(UsersTemplate {
        total: users.len(),
        paid_total,
        users,
    })
}

/// Render the add-paid-user form.
pub async fn create_page() -> AppResult<Html<String>> {
    render(CreateTemplate {})
}

/// Render the remove-paid-user form.
pub async fn delete_page() -> AppResult<Html<String>> {
    render(DeleteTemplate {})
}

fn render<T: Template>(template: T) -> AppResult<Html<String>> {
    Ok(Html(template.render().map_err(|e| {
        error!("Template render error: {}", e);
        AppError::InternalError(format!("Template render error: {e}"))
    })?))
}
