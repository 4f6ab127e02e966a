use crate::web::AppState;
use axum::{extract::State, routing::get, Json, Router};
use smsgate_common::{api::stats, DashboardStats};
use std::sync::Arc;

async fn get_stats_handler(State(app_state): State<Arc<AppState>>) -> Json<DashboardStats> {
    Json(app_state.store.stats().await)
}

pub fn create_stats_router() -> Router<Arc<AppState>> {
    Router::new().route(&stats::GET.router_path(), get(get_stats_handler))
}
