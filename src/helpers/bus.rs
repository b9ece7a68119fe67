use tokio::sync::broadcast;
use tracing::debug;

/// Cross-component notifications, e.g. toasts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    Success(String),
    Warning(String),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BusEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Fire and forget; an event nobody listens to is dropped.
    pub fn emit(&self, event: BusEvent) {
        if self.sender.send(event).is_err() {
            debug!("Bus event dropped: no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_events() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        bus.emit(BusEvent::Success("done".into()));
        assert_eq!(rx.recv().await.unwrap(), BusEvent::Success("done".into()));
    }

    #[test]
    fn emitting_without_subscribers_is_fine() {
        EventBus::new(1).emit(BusEvent::Warning("nobody home".into()));
    }
}
