use axum::{extract::State, http::Method, routing::get, Json, Router};
use serde::Serialize;
use smsgate_common::api;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::store::GatewayStore;
use crate::version::VERSION;
use crate::web::routes::*;

pub mod error;
pub mod routes;
pub mod websocket_handler;

pub use error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<GatewayStore>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    loading: bool,
    version: &'static str,
    pending_deliveries: usize,
}

async fn health_check_handler(State(app_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        loading: app_state.store.is_loading().await,
        version: VERSION,
        pending_deliveries: app_state.store.pending_deliveries(),
    })
}

pub fn create_axum_router(store: Arc<GatewayStore>) -> Router {
    let app_state = Arc::new(AppState { store });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route(&api::HEALTH.router_path(), get(health_check_handler))
        .route(&api::EVENTS.router_path(), get(websocket_handler::events_websocket_handler))
        .merge(contact_routes::create_contacts_router())
        .merge(message_routes::create_messages_router())
        .merge(stats_routes::create_stats_router())
        .merge(settings_routes::create_settings_router())
        .with_state(app_state)
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModemSettings;
    use crate::store::{SeedData, StoreTimings};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use chrono::Utc;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use smsgate_common::{Contact, Message, MessageStatus};
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_app() -> (Router, Arc<GatewayStore>) {
        let store = Arc::new(GatewayStore::new(
            SeedData::demo(Utc::now(), &ModemSettings::default()),
            StoreTimings::default(),
        ));
        (create_axum_router(store.clone()), store)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn lists_seeded_contacts_and_messages() {
        let (app, _store) = test_app();

        let response = app.clone().oneshot(empty_request("GET", "/api/contacts")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let contacts: Vec<Contact> = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(contacts.len(), 3);

        let response = app.oneshot(empty_request("GET", "/api/messages")).await.unwrap();
        let messages: Vec<Message> = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(messages.len(), 15);
        assert_eq!(messages[0].id, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn create_contact_returns_201_with_next_id() {
        let (app, _store) = test_app();
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/contacts",
                json!({ "name": "Dana", "phone": "+15550199", "group": "Work" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["id"], 4);
        assert_eq!(body["isFavorite"], false);
        assert!(body["createdAt"].is_string());
    }

    #[tokio::test(start_paused = true)]
    async fn create_contact_without_phone_is_400() {
        let (app, _store) = test_app();
        let response = app
            .oneshot(json_request("POST", "/api/contacts", json!({ "name": "Dana", "phone": "" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["field"], "phone");
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_body_is_400_with_message() {
        let (app, _store) = test_app();
        let response = app
            .oneshot(json_request("POST", "/api/messages/send", json!({ "content": "Hi" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["message"].is_string());
    }

    fn assert_json_message(response: &Response) {
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(content_type.starts_with("application/json"), "got {content_type}");
    }

    #[tokio::test(start_paused = true)]
    async fn non_numeric_contact_id_is_json_400() {
        let (app, store) = test_app();

        let response = app
            .clone()
            .oneshot(json_request("PUT", "/api/contacts/abc", json!({ "name": "Nobody" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_json_message(&response);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("abc"));
        assert!(body.get("field").is_none());

        let response = app.oneshot(empty_request("DELETE", "/api/contacts/abc")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_json_message(&response);
        assert!(body_json(response).await["message"].is_string());

        assert_eq!(store.contacts(&Default::default()).await.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn bad_query_string_is_json_400() {
        let (app, _store) = test_app();

        let response = app
            .oneshot(empty_request("GET", "/api/messages?limit=abc"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_json_message(&response);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("limit"));
    }

    #[tokio::test(start_paused = true)]
    async fn update_and_delete_follow_contract_codes() {
        let (app, _store) = test_app();

        let response = app
            .clone()
            .oneshot(json_request("PUT", "/api/contacts/1", json!({ "isFavorite": false })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["isFavorite"], false);
        assert_eq!(body["name"], "Alice Johnson");

        let response = app
            .clone()
            .oneshot(json_request("PUT", "/api/contacts/42", json!({ "name": "Nobody" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_json(response).await["message"].is_string());

        let response = app.clone().oneshot(empty_request("DELETE", "/api/contacts/2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.oneshot(empty_request("DELETE", "/api/contacts/2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test(start_paused = true)]
    async fn send_message_is_queued_then_sent() {
        let (app, store) = test_app();
        let sent_before = store.stats().await.total_sent;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/messages/send",
                json!({ "direction": "outbound", "recipient": "+15550101", "content": "Hi", "simSlot": 1 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let queued: Message = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(queued.status, MessageStatus::Queued);

        let response = app.clone().oneshot(empty_request("GET", "/api/stats")).await.unwrap();
        let stats = body_json(response).await;
        assert_eq!(stats["totalSent"], sent_before + 1);

        tokio::time::sleep(Duration::from_millis(2100)).await;
        let response = app
            .oneshot(empty_request("GET", "/api/messages?limit=1"))
            .await
            .unwrap();
        let latest: Vec<Message> = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].id, queued.id);
        assert_eq!(latest[0].status, MessageStatus::Sent);
    }

    #[tokio::test(start_paused = true)]
    async fn message_history_filters() {
        let (app, _store) = test_app();

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/messages?direction=outbound"))
            .await
            .unwrap();
        let outbound: Vec<Message> = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(outbound.len(), 5);

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/messages?search=verification&direction=all"))
            .await
            .unwrap();
        let codes: Vec<Message> = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(codes.len(), 10);

        let response = app
            .oneshot(empty_request("GET", "/api/messages?direction=sideways"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test(start_paused = true)]
    async fn contact_search() {
        let (app, _store) = test_app();
        let response = app
            .oneshot(empty_request("GET", "/api/contacts?search=carol"))
            .await
            .unwrap();
        let contacts: Vec<Contact> = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].id, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn settings_can_be_listed_and_saved() {
        let (app, _store) = test_app();

        let response = app.clone().oneshot(empty_request("GET", "/api/settings")).await.unwrap();
        let settings = body_json(response).await;
        assert_eq!(settings.as_array().unwrap().len(), 5);

        let response = app
            .clone()
            .oneshot(json_request("PUT", "/api/settings/baud_rate", json!({ "value": "115200" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let saved = body_json(response).await;
        assert_eq!(saved["value"], "115200");
        assert_eq!(saved["category"], "modem");

        let response = app
            .oneshot(json_request("PUT", "/api/settings/baud_rate", json!({ "value": " " })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test(start_paused = true)]
    async fn health_reports_loading_state() {
        let (app, _store) = test_app();

        let response = app.clone().oneshot(empty_request("GET", "/api/health")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["loading"], true);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        let response = app.oneshot(empty_request("GET", "/api/health")).await.unwrap();
        assert_eq!(body_json(response).await["loading"], false);
    }
}
