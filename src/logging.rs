use crate::config::AppConfig;
use std::{
    env, fs,
    io::Write,
    panic,
    path::PathBuf,
    sync::atomic::{AtomicBool, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

const LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
const CRASH_LOG_MAX_BYTES: u64 = 256 * 1024;
static LOG_ENABLED: AtomicBool = AtomicBool::new(false);
static CRASH_LOG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Path to the temp log file we rotate between runs.
pub fn log_file_path() -> PathBuf {
    env::temp_dir().join("cwterm.log")
}

/// Path to the crash log file (panic metadata only).
pub fn crash_log_path() -> PathBuf {
    env::temp_dir().join("cwterm_crash.log")
}

/// Size-capped append log. Once the cap would be exceeded the file is
/// truncated rather than rotated to a second file, so a long-running
/// session cannot fill the temp dir.
struct RollingLog {
    path: PathBuf,
    max_bytes: u64,
}

impl RollingLog {
    fn debug() -> Self {
        Self {
            path: log_file_path(),
            max_bytes: LOG_MAX_BYTES,
        }
    }

    fn crash() -> Self {
        Self {
            path: crash_log_path(),
            max_bytes: CRASH_LOG_MAX_BYTES,
        }
    }

    fn append(&self, line: &str) {
        let on_disk = fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        let mut options = fs::OpenOptions::new();
        options.create(true);
        if on_disk.saturating_add(line.len() as u64) > self.max_bytes {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }
        if let Ok(mut file) = options.open(&self.path) {
            let _ = file.write_all(line.as_bytes());
        }
    }
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Configure logging based on CLI flags or environment.
pub fn init_logging(config: &AppConfig) {
    let enabled = (config.logs || config.log_timings) && !config.no_logs;
    LOG_ENABLED.store(enabled, Ordering::Relaxed);
    CRASH_LOG_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Write debug messages to a temp file so we can troubleshoot without corrupting raw mode.
pub fn log_debug(msg: &str) {
    if !LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    RollingLog::debug().append(&format!("[{}] {msg}\n", unix_timestamp()));
}

/// Write a crash log entry with the panic location and payload.
pub fn log_panic(info: &panic::PanicHookInfo<'_>) {
    if !CRASH_LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }

    let location = info
        .location()
        .map(|loc| format!("{}:{}", loc.file(), loc.line()))
        .unwrap_or_else(|| "unknown".to_string());

    let payload = if let Some(text) = info.payload().downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = info.payload().downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    };

    let line = format!(
        "[{}] panic at {location}: {payload} (v{})\n",
        unix_timestamp(),
        env!("CARGO_PKG_VERSION")
    );
    RollingLog::crash().append(&line);
}

#[cfg(test)]
pub(crate) fn set_logging_for_tests(enabled: bool) {
    LOG_ENABLED.store(enabled, Ordering::Relaxed);
    CRASH_LOG_ENABLED.store(enabled, Ordering::Relaxed);
}
