pub mod classify;
pub mod cluster;
pub mod config;
pub mod decode;
pub mod doctor;
pub mod events;
mod logging;
pub mod session;
pub mod telemetry;
pub mod terminal_restore;

pub use events::{scripted_keying, EventSource, KeyerEvent, ScriptedSource};
pub use logging::{crash_log_path, init_logging, log_debug, log_file_path, log_panic};
pub use session::{KeySpan, KeyTracker, Session};
