pub mod collaborator;
pub mod events;
pub mod options;
pub mod session;
pub mod ui;

pub use collaborator::{BridgeLauncher, ProcessLaunchError, ProcessLauncher};
pub use events::{EventSink, LaunchEvent, ProgressUpdate};
pub use options::LaunchOptions;
pub use session::{LaunchOrchestrator, LaunchOutcome, LaunchRequest, SessionState};
pub use ui::{UiMessage, UiTarget};
