pub mod api;
pub mod posts;

use axum::Router;
use crate::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(api::routes())
}
