use crate::store::ContactFilter;
use crate::web::{AppError, AppState};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use smsgate_common::{api::contacts, Contact, ContactPatch, NewContact};
use std::sync::Arc;

// --- Request/Response Structs ---

#[derive(Deserialize, Debug, Default)]
pub struct ContactListQuery {
    search: Option<String>,
}

// --- Route Handlers ---

async fn list_contacts_handler(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<ContactListQuery>, QueryRejection>,
) -> Result<Json<Vec<Contact>>, AppError> {
    let Query(query) = query?;
    let filter = ContactFilter {
        search: query.search,
    };
    Ok(Json(app_state.store.contacts(&filter).await))
}

async fn create_contact_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<NewContact>, JsonRejection>,
) -> Result<(StatusCode, Json<Contact>), AppError> {
    let Json(payload) = payload?;
    let contact = app_state.store.add_contact(payload).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

async fn update_contact_handler(
    State(app_state): State<Arc<AppState>>,
    contact_id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<ContactPatch>, JsonRejection>,
) -> Result<Json<Contact>, AppError> {
    let Path(contact_id) = contact_id?;
    let Json(payload) = payload?;
    let contact = app_state.store.update_contact(contact_id, payload).await?;
    Ok(Json(contact))
}

async fn delete_contact_handler(
    State(app_state): State<Arc<AppState>>,
    contact_id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(contact_id) = contact_id?;
    app_state.store.delete_contact(contact_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Router ---

pub fn create_contacts_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &contacts::LIST.router_path(),
            get(list_contacts_handler).post(create_contact_handler),
        )
        .route(
            &contacts::UPDATE.router_path(),
            put(update_contact_handler).delete(delete_contact_handler),
        )
}
