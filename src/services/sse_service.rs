use std::convert::Infallible;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::{
    dto::{notification::Notification, sse::ServerEvent},
    state::SharedState,
};

const EVENT_NOTIFICATION: &str = "notification";

/// Subscribe to the notification stream.
pub fn subscribe_notifications(state: &SharedState) -> broadcast::Receiver<ServerEvent> {
    state.notifications().subscribe()
}

/// Publish produced notifications to every SSE subscriber, in order.
pub fn broadcast_notifications(state: &SharedState, notifications: &[Notification]) {
    for notification in notifications {
        match ServerEvent::json(EVENT_NOTIFICATION.to_string(), notification) {
            Ok(event) => state.notifications().broadcast(event),
            Err(err) => warn!(error = %err, "failed to serialise notification"),
        }
    }
}

/// Convert a broadcast receiver into an SSE response, forwarding events until
/// the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            let mut event = Event::default().data(payload.data);
                            if let Some(name) = payload.event {
                                event = event.event(name);
                            }

                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "notification subscriber lagged; dropping messages");
                            continue;
                        }
                    }
                }
            }
        }

        info!("notification SSE stream disconnected");
    });

    Sse::new(ReceiverStream::new(rx)).keep_alive(KeepAlive::default())
}
