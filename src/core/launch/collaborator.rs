// ─── Process Launcher ───
// The external component that installs Forge, fetches assets, and runs the JVM.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::events::{EventSink, LaunchEvent, ProgressUpdate};
use super::options::LaunchOptions;

/// Failure reported by a process launcher. The game may still be running.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ProcessLaunchError(pub String);

#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Run a launch, reporting through `events` while it goes.
    ///
    /// Return once the game has been handed off. Clones of `events` kept
    /// after returning are still relayed to the window until dropped.
    async fn launch(&self, options: LaunchOptions, events: EventSink)
        -> Result<(), ProcessLaunchError>;
}

/// One line of the bridge's stdout protocol.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum BridgeMessage {
    Data {
        line: String,
    },
    Error {
        message: String,
    },
    Progress {
        task: u64,
        total: u64,
        #[serde(rename = "type")]
        kind: String,
        file: String,
    },
}

impl From<BridgeMessage> for LaunchEvent {
    fn from(message: BridgeMessage) -> Self {
        match message {
            BridgeMessage::Data { line } => LaunchEvent::Data(line),
            BridgeMessage::Error { message } => LaunchEvent::Error(message),
            BridgeMessage::Progress {
                task,
                total,
                kind,
                file,
            } => LaunchEvent::Progress(ProgressUpdate {
                task,
                total,
                kind,
                file,
            }),
        }
    }
}

fn parse_stdout_line(line: &str) -> LaunchEvent {
    serde_json::from_str::<BridgeMessage>(line)
        .map(LaunchEvent::from)
        .unwrap_or_else(|_| LaunchEvent::Data(line.to_string()))
}

/// Delegates to an external launcher program (for example a Node script
/// wrapping `minecraft-launcher-core`).
///
/// The options are written to the child's stdin as one JSON document. Each
/// stdout line is either a JSON event (`{"event":"progress",...}`) or plain
/// output; stderr lines are reported as errors. The launch resolves when the
/// program exits, and a non-zero exit is reported as a failure.
#[derive(Debug, Clone)]
pub struct BridgeLauncher {
    program: PathBuf,
    args: Vec<String>,
}

impl BridgeLauncher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

#[async_trait]
impl ProcessLauncher for BridgeLauncher {
    async fn launch(
        &self,
        options: LaunchOptions,
        events: EventSink,
    ) -> Result<(), ProcessLaunchError> {
        let payload = serde_json::to_vec(&options)
            .map_err(|e| ProcessLaunchError(format!("cannot encode launch options: {e}")))?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(&options.root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(false);

        info!("Starting launcher bridge {:?}", self.program);
        debug!("Bridge command: {:?}", cmd);

        let mut child = cmd
            .spawn()
            .map_err(|e| ProcessLaunchError(format!("cannot start {:?}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&payload)
                .await
                .map_err(|e| ProcessLaunchError(format!("cannot send launch options: {e}")))?;
            // Closing stdin marks the end of the document.
            drop(stdin);
        }

        let stdout_relay = child.stdout.take().map(|stdout| {
            let events = events.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    events.send(parse_stdout_line(&line)).await;
                }
            })
        });

        let stderr_relay = child.stderr.take().map(|stderr| {
            let events = events.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    events.error(line).await;
                }
            })
        });

        let status = child
            .wait()
            .await
            .map_err(|e| ProcessLaunchError(format!("failed while waiting for bridge: {e}")))?;

        join_output_readers([stdout_relay, stderr_relay].into_iter().flatten()).await;

        if status.success() {
            Ok(())
        } else {
            Err(ProcessLaunchError(match status.code() {
                Some(code) => format!("launcher bridge exited with code {code}"),
                None => "launcher bridge terminated without exit code".into(),
            }))
        }
    }
}

async fn join_output_readers(readers: impl IntoIterator<Item = JoinHandle<()>>) {
    for reader in readers {
        if let Err(err) = reader.await {
            warn!("Bridge output reader aborted: {err}");
        }
    }
}
