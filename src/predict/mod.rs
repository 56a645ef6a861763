pub mod classifier;
pub mod disease;
mod dto;
pub mod features;
pub mod gateway;
pub mod handlers;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::predict_routes()
}
