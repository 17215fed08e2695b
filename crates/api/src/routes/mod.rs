//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod analytics;
pub mod auth;
pub mod budgets;
pub mod expenses;
pub mod health;
pub mod notifications;
pub mod reports;
pub mod teams;
pub mod users;

/// Creates the API router: public routes plus the authenticated ones.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(users::routes())
        .merge(teams::routes())
        .merge(expenses::routes())
        .merge(budgets::routes())
        .merge(notifications::routes())
        .merge(reports::routes())
        .merge(analytics::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}
