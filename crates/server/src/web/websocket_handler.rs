use axum::{
    extract::{
        ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::stream::StreamExt;
use smsgate_common::GatewayEvent;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::web::AppState;

pub async fn events_websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn send_event(socket: &mut WebSocket, event: &GatewayEvent) -> bool {
    match serde_json::to_string(event) {
        Ok(json_data) => socket
            .send(Message::Text(Utf8Bytes::from(json_data)))
            .await
            .is_ok(),
        Err(e) => {
            warn!(event = event.kind(), error = %e, "Failed to serialize store event.");
            true
        }
    }
}

async fn send_snapshot(socket: &mut WebSocket, app_state: &AppState) -> bool {
    let snapshot = GatewayEvent::Snapshot(app_state.store.snapshot().await);
    send_event(socket, &snapshot).await
}

async fn handle_socket(mut socket: WebSocket, app_state: Arc<AppState>) {
    info!("Event stream client connected.");

    // Subscribe before taking the snapshot so no change falls in between.
    let mut rx = app_state.store.subscribe();

    // 1. Send initial data snapshot
    if !send_snapshot(&mut socket, &app_state).await {
        warn!("Error sending initial snapshot. Closing connection.");
        return;
    }

    // 2. Forward store events and answer client pings
    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        if !send_event(&mut socket, &event).await {
                            debug!("Error sending store event. Breaking loop.");
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Event stream client lagged; resending snapshot.");
                        if !send_snapshot(&mut socket, &app_state).await {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => {
                        info!("Store event channel closed. Closing connection.");
                        break;
                    }
                }
            }
            msg = socket.next() => {
                match msg {
                    Some(Ok(Message::Text(t))) => {
                        if t.as_str() == "ping"
                            && socket.send(Message::Text(Utf8Bytes::from_static("pong"))).await.is_err()
                        {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(p))) => {
                        if socket.send(Message::Pong(p)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("Event stream client closed the connection.");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(error = %e, "Error receiving from event stream client.");
                        break;
                    }
                }
            }
        }
    }

    info!("Event stream client disconnected.");
}
