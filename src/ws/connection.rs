//! WebSocket Connection Management - reader and writer tasks of one socket

use crate::dtos::{ClientEvent, ServerEvent};
use crate::entities::CurrentUser;
use crate::ws::RATE_LIMITER_MILLIS;
use crate::ws::event_handlers::process_event;
use crate::ws::presence::{ConnectionHandle, ConnectionId};
use crate::AppState;
use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc::{Receiver, channel};
use tokio::sync::oneshot;
use tokio::time::{Duration, interval, timeout};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info, instrument, warn};

#[instrument(skip(ws, state, user), fields(user_id = %user.user_id))]
pub async fn handle_socket(ws: WebSocket, state: Arc<AppState>, user: CurrentUser) {
    info!("WebSocket connection established");

    // Split the socket so reading and writing proceed independently
    let (ws_tx, ws_rx) = ws.split();

    // Bounded: pushes use try_send and drop on overflow instead of waiting
    let (outbound_tx, outbound_rx) =
        channel::<Arc<ServerEvent>>(state.settings.outbound_queue_capacity);
    let handle = ConnectionHandle::new(outbound_tx);

    // The queue stays open while presence holds a clone, so the writer is
    // told explicitly when the reader is done
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(write_ws(handle.id(), ws_tx, outbound_rx, shutdown_rx));
    tokio::spawn(listen_ws(user, ws_rx, handle, shutdown_tx, state));
}

#[instrument(skip(websocket_tx, outbound_rx, shutdown_rx))]
pub async fn write_ws(
    connection_id: ConnectionId,
    mut websocket_tx: SplitSink<WebSocket, Message>,
    outbound_rx: Receiver<Arc<ServerEvent>>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    info!("Write task started");
    let mut outbound = ReceiverStream::new(outbound_rx);

    loop {
        tokio::select! {
            event = StreamExt::next(&mut outbound) => match event {
                Some(event) => {
                    if send_event(&mut websocket_tx, &event).await.is_err() {
                        warn!("Failed to write event, closing connection");
                        break;
                    }
                }
                None => {
                    info!("Outbound queue closed");
                    break;
                }
            },
            _ = &mut shutdown_rx => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    let _ = websocket_tx.close().await;
    info!("Write task terminated");
}

async fn send_event(
    websocket_tx: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).map_err(|e| {
        error!("Failed to serialize {} event: {:?}", event.name(), e);
        axum::Error::new(e)
    })?;
    websocket_tx
        .send(Message::Text(Utf8Bytes::from(json)))
        .await
        .map_err(|e| {
            error!("Failed to send event through WebSocket: {:?}", e);
            e
        })
}

#[instrument(skip(user, websocket_rx, handle, shutdown_tx, state), fields(user_id = %user.user_id, connection_id = handle.id()))]
pub async fn listen_ws(
    user: CurrentUser,
    mut websocket_rx: SplitStream<WebSocket>,
    handle: ConnectionHandle,
    shutdown_tx: oneshot::Sender<()>,
    state: Arc<AppState>,
) {
    info!("Listen task started");

    let mut rate_limiter = interval(Duration::from_millis(RATE_LIMITER_MILLIS));
    let idle_timeout = state.settings.ws_idle_timeout;

    loop {
        match timeout(idle_timeout, StreamExt::next(&mut websocket_rx)).await {
            Ok(Some(msg_result)) => {
                rate_limiter.tick().await;

                let msg = match msg_result {
                    Ok(m) => m,
                    Err(e) => {
                        warn!("WebSocket error: {:?}", e);
                        break;
                    }
                };

                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => process_event(&state, &user, &handle, event).await,
                        Err(e) => {
                            warn!("Failed to deserialize client event: {}", e);
                            handle.push(Arc::new(ServerEvent::error("Malformed event")));
                        }
                    },
                    Message::Close(_) => {
                        info!("Close message received");
                        break;
                    }
                    _ => {}
                }
            }
            Ok(None) => {
                info!("WebSocket stream ended");
                break;
            }
            Err(_) => {
                warn!(
                    timeout_secs = idle_timeout.as_secs(),
                    "Connection idle timeout"
                );
                break;
            }
        }
    }

    // Presence goes first so no later lookup can reach this connection
    info!("Cleaning up connection");
    state.presence.leave(handle.id());
    let _ = shutdown_tx.send(());
    info!("Listen task terminated");
}
