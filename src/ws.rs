// ws.rs
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::state::AppState;

/// Upgrades the connection and streams poll events to the subscriber as
/// JSON text frames. No replay: a subscriber connecting late starts from
/// the next event and is expected to resync via `GET /poll`.
pub async fn subscribe(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run(socket, state))
}

async fn run(socket: WebSocket, state: AppState) {
    let conn_id = Uuid::new_v4();
    let mut rx = state.service.subscribe();
    debug!(%conn_id, "subscriber connected");

    let (mut sink, mut stream) = socket.split();

    let mut forward = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let frame = match serde_json::to_string(&event) {
                        Ok(frame) => frame,
                        Err(err) => {
                            warn!(%conn_id, error = %err, "failed to encode event");
                            continue;
                        }
                    };
                    if sink.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                // Slow subscriber: overwritten events are gone for it.
                Err(RecvError::Lagged(missed)) => {
                    warn!(%conn_id, missed, "subscriber lagging, events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Inbound frames carry nothing; the read half only watches for close.
    let mut drain = tokio::spawn(async move {
        while let Some(Ok(frame)) = stream.next().await {
            if let Message::Close(_) = frame {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut forward => drain.abort(),
        _ = &mut drain => forward.abort(),
    }
    debug!(%conn_id, "subscriber disconnected");
}
