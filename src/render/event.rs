use std::{path::PathBuf, sync::mpsc::Sender};

/// Progress and result notifications from a render attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderEvent {
    /// Human-readable progress line such as `"Cut OK..."`.
    Status(String),
    Committed(PathBuf),
    /// User-visible failure text.
    Failed(String),
    /// The attempt was discarded because a newer render was requested.
    Superseded { epoch: u64 },
}

/// Optional event channel; sends to a dropped receiver are ignored.
#[derive(Clone, Debug, Default)]
pub struct EventSink(Option<Sender<RenderEvent>>);

impl EventSink {
    pub fn new(tx: Sender<RenderEvent>) -> Self {
        Self(Some(tx))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn send(&self, event: RenderEvent) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event);
        }
    }

    pub fn status(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::info!(status = %text);
        self.send(RenderEvent::Status(text));
    }
}
