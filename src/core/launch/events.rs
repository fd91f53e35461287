use tokio::sync::mpsc;

/// Events buffered per session before the launcher is made to wait.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// One progress tick from the launcher (`task` of `total` done).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub task: u64,
    pub total: u64,
    pub kind: String,
    pub file: String,
}

impl ProgressUpdate {
    pub fn percent(&self) -> u8 {
        progress_percent(self.task, self.total)
    }
}

/// `round(task / total * 100)`, kept within 0..=100. A zero total reports 0.
pub fn progress_percent(task: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = task as f64 / total as f64 * 100.0;
    ratio.round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchEvent {
    /// A raw output line from the game or launcher.
    Data(String),
    /// Reported by the launcher; does not end the session on its own.
    Error(String),
    Progress(ProgressUpdate),
}

/// Sending half of a session's event channel, handed to the process launcher.
///
/// Sends wait while the channel is full. Once the session has stopped
/// listening every send is a no-op.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<LaunchEvent>,
}

impl EventSink {
    /// Returns `false` when nobody is listening anymore.
    pub async fn send(&self, event: LaunchEvent) -> bool {
        self.tx.send(event).await.is_ok()
    }

    pub async fn data(&self, line: impl Into<String>) -> bool {
        self.send(LaunchEvent::Data(line.into())).await
    }

    pub async fn error(&self, message: impl Into<String>) -> bool {
        self.send(LaunchEvent::Error(message.into())).await
    }

    pub async fn progress(
        &self,
        task: u64,
        total: u64,
        kind: impl Into<String>,
        file: impl Into<String>,
    ) -> bool {
        self.send(LaunchEvent::Progress(ProgressUpdate {
            task,
            total,
            kind: kind.into(),
            file: file.into(),
        }))
        .await
    }
}

pub fn channel() -> (EventSink, mpsc::Receiver<LaunchEvent>) {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    (EventSink { tx }, rx)
}
