// Export route modules
pub mod health;
pub mod reply;
pub mod session;
pub mod ui;

use crate::state::AppState;
use axum::Router;

// Function to configure all routes
pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(ui::routes())
        .merge(health::routes())
        .merge(session::routes(state.clone()))
        .merge(reply::routes(state))
}
