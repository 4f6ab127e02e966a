use crate::web::{AppError, AppState};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::{get, put},
    Json, Router,
};
use smsgate_common::{api::settings, Setting, SettingUpdate};
use std::sync::Arc;

pub fn create_settings_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(&settings::LIST.router_path(), get(list_settings_handler))
        .route(&settings::UPDATE.router_path(), put(update_setting_handler))
}

async fn list_settings_handler(State(app_state): State<Arc<AppState>>) -> Json<Vec<Setting>> {
    Json(app_state.store.settings().await)
}

async fn update_setting_handler(
    State(app_state): State<Arc<AppState>>,
    key: Result<Path<String>, PathRejection>,
    payload: Result<Json<SettingUpdate>, JsonRejection>,
) -> Result<Json<Setting>, AppError> {
    let Path(key) = key?;
    let Json(payload) = payload?;
    let setting = app_state.store.update_setting(&key, payload).await?;
    Ok(Json(setting))
}
