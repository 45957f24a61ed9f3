use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::{event::InboundEvent, notification::Notification},
    services::bomb_service,
    state::SharedState,
};

/// Internal error type for bridge frame handling.
#[derive(Debug, Error)]
enum BridgeError {
    /// Writer channel closed - connection should be terminated immediately.
    #[error("connection closed")]
    ConnectionClosed,
}

/// Handle the full lifecycle of a chat bridge WebSocket connection.
///
/// Every text frame is an [`InboundEvent`]; every resulting notification is
/// written back as its own text frame.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let connection_id = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    info!(%connection_id, "chat bridge connected");

    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if handle_frame(&state, connection_id, text.as_str(), &outbound_tx).is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => debug!(%connection_id, "ignoring non-text frame"),
            Err(err) => {
                warn!(%connection_id, error = %err, "websocket receive error");
                break;
            }
        }
    }

    info!(%connection_id, "chat bridge disconnected");
    finalize(writer_task, outbound_tx).await;
}

fn handle_frame(
    state: &SharedState,
    connection_id: Uuid,
    raw: &str,
    outbound_tx: &mpsc::UnboundedSender<Message>,
) -> Result<(), BridgeError> {
    let event = match InboundEvent::from_json_str(raw) {
        Ok(event) => event,
        Err(err) => {
            warn!(%connection_id, error = %err, "failed to parse or validate inbound event");
            return Ok(());
        }
    };

    let outcome = bomb_service::handle_event(state, event);
    for notification in &outcome.notifications {
        send_notification(outbound_tx, notification)?;
    }
    Ok(())
}

/// Serialize a notification and queue it on the writer channel.
///
/// Serialization failures are logged and dropped; a closed writer is reported
/// so the caller can tear the connection down.
fn send_notification(
    tx: &mpsc::UnboundedSender<Message>,
    notification: &Notification,
) -> Result<(), BridgeError> {
    let payload = match serde_json::to_string(notification) {
        Ok(p) => p,
        Err(err) => {
            warn!(error = %err, "failed to serialize notification `{notification:?}`");
            return Ok(());
        }
    };

    tx.send(Message::Text(payload.into()))
        .map_err(|_| BridgeError::ConnectionClosed)
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
