use tokio::sync::broadcast;

use crate::dto::sse::ServerEvent;

/// Broadcast hub fanning notifications out to SSE subscribers.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Number of connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Send an event to all current subscribers; without subscribers the event is dropped.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_broadcasts() {
        let hub = SseHub::new(4);
        let mut receiver = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);

        hub.broadcast(ServerEvent {
            event: Some("notification".into()),
            data: "{}".into(),
        });

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some("notification"));
    }

    #[test]
    fn broadcasting_without_subscribers_is_harmless() {
        let hub = SseHub::new(4);
        hub.broadcast(ServerEvent {
            event: None,
            data: String::new(),
        });
    }
}
