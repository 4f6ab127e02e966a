use crate::store::MessageFilter;
use crate::web::{AppError, AppState};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use smsgate_common::{api::messages, Message, MessageDirection, NewMessage};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Deserialize, Debug, Default)]
pub struct MessageListQuery {
    search: Option<String>,
    /// `inbound`, `outbound`, or `all`.
    direction: Option<String>,
    limit: Option<usize>,
}

impl MessageListQuery {
    fn into_filter(self) -> Result<MessageFilter, AppError> {
        let direction = match self.direction.as_deref() {
            None | Some("") | Some("all") => None,
            Some(raw) => Some(MessageDirection::from_str(raw).map_err(|_| {
                AppError::InvalidInput(format!(
                    "Unknown direction '{raw}', expected inbound, outbound or all"
                ))
            })?),
        };
        Ok(MessageFilter {
            search: self.search,
            direction,
            limit: self.limit,
        })
    }
}

async fn list_messages_handler(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<MessageListQuery>, QueryRejection>,
) -> Result<Json<Vec<Message>>, AppError> {
    let Query(query) = query?;
    let filter = query.into_filter()?;
    Ok(Json(app_state.store.messages(&filter).await))
}

async fn send_message_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<NewMessage>, JsonRejection>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let Json(payload) = payload?;
    let message = app_state.store.send_message(payload).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub fn create_messages_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(&messages::LIST.router_path(), get(list_messages_handler))
        .route(&messages::SEND.router_path(), post(send_message_handler))
}
