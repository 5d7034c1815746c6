//! WebSocket upgrade handler and per-socket event loop.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use uuid::Uuid;

use playroom_realtime::connection::authenticator::WsAuthenticator;
use playroom_realtime::connection::heartbeat::run_watchdog;
use playroom_realtime::ServerEvent;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the WebSocket handshake.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// JWT access token.
    pub token: String,
}

/// GET /ws?token={jwt} — WebSocket upgrade.
///
/// The token is verified before the upgrade, so an invalid or expired
/// token is rejected with 401 and no socket is ever opened.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    let authenticator = WsAuthenticator::new(state.jwt_decoder.clone());
    let user = authenticator.authenticate(&query.token)?;

    Ok(ws.on_upgrade(move |socket| handle_socket(state, user.user_id, socket)))
}

/// Runs an established WebSocket connection until it closes.
async fn handle_socket(state: AppState, user_id: Uuid, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (handle, mut outbound_rx) = state.realtime.connect(user_id).await;
    let conn_id = handle.id;

    // Forward engine events to the socket as JSON text frames.
    let outbound_task = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize outbound event");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut watchdog = tokio::spawn(run_watchdog(
        handle.clone(),
        state.realtime.heartbeat_config(),
    ));

    loop {
        tokio::select! {
            _ = &mut watchdog => break,
            incoming = ws_rx.next() => {
                let Some(result) = incoming else { break };
                match result {
                    Ok(Message::Text(text)) => {
                        handle.touch().await;
                        match serde_json::from_str(&text) {
                            Ok(event) => state.realtime.handle_event(user_id, event).await,
                            Err(e) => {
                                tracing::debug!(
                                    user_id = %user_id,
                                    error = %e,
                                    "Unparseable client event"
                                );
                                handle.send(ServerEvent::Error {
                                    code: "BAD_EVENT".to_string(),
                                    message: format!("Unparseable event: {e}"),
                                });
                            }
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                        // Protocol-level frames count as activity.
                        handle.touch().await;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                        break;
                    }
                }
            }
        }
    }

    outbound_task.abort();
    watchdog.abort();
    state.realtime.disconnect(user_id, conn_id).await;
}
