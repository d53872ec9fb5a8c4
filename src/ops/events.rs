use std::time::Duration;

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use futures::{stream, Stream, StreamExt};
use tokio::sync::broadcast;

use crate::model::StatusOut;

#[derive(Clone)]
pub struct EventsHub {
    sender: broadcast::Sender<StatusOut>,
}

impl EventsHub {
    pub fn new(buffer: usize) -> Self {
        let (tx, _rx) = broadcast::channel(buffer.max(1));
        Self { sender: tx }
    }

    /// No subscribers is not an error; the snapshot is simply dropped.
    pub fn publish(&self, status: StatusOut) {
        let _ = self.sender.send(status);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusOut> {
        self.sender.subscribe()
    }
}

/// `initial` first, then every change on `rx`. The receiver must be
/// subscribed before `initial` is read. Lagged receivers skip ahead to the
/// newest snapshot.
pub fn status_stream(
    rx: broadcast::Receiver<StatusOut>,
    initial: StatusOut,
) -> impl Stream<Item = Result<SseEvent, std::convert::Infallible>> {
    let updates = tokio_stream::wrappers::BroadcastStream::new(rx)
        .filter_map(|item| async move { item.ok() });
    stream::once(async move { initial })
        .chain(updates)
        .map(|status| Ok(status_event(&status)))
}

fn status_event(status: &StatusOut) -> SseEvent {
    let json = serde_json::to_string(status).unwrap_or_else(|_| "{}".to_string());
    SseEvent::default().event("status").data(json)
}

pub fn sse_response(
    rx: broadcast::Receiver<StatusOut>,
    initial: StatusOut,
) -> Sse<impl Stream<Item = Result<SseEvent, std::convert::Infallible>>> {
    Sse::new(status_stream(rx, initial)).keep_alive(KeepAlive::new().interval(Duration::from_secs(20)))
}
