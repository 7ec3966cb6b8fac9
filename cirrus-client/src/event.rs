use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, error::TryRecvError};

/// Lifecycle notifications, raised from the client's own tasks.
#[derive(Debug)]
pub enum Event {
    Connected,
    ConnectFailed(std::io::Error),
    Disconnected,
}

#[derive(Debug, Clone)]
pub(crate) struct EventSource {
    sender: UnboundedSender<Event>,
}

impl EventSource {
    pub(crate) fn new() -> (Self, EventSink) {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        (Self { sender }, EventSink { receiver })
    }

    pub(crate) fn raise(&self, event: Event) {
        log::debug!("raising {event:?}");
        // nobody listening is fine, the host may not care about events
        let _ = self.sender.send(event);
    }
}

#[derive(Debug)]
pub struct EventSink {
    receiver: UnboundedReceiver<Event>,
}

impl EventSink {
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Result<Event, TryRecvError> {
        self.receiver.try_recv()
    }
}
