use crate::{config::AppConfig, crash_log_path, log_file_path, telemetry::tracing_log_path};
use crossterm::terminal::size as terminal_size;
use crossterm::tty::IsTty;
use std::{env, fmt::Display, io};

pub struct DoctorReport {
    lines: Vec<String>,
}

impl DoctorReport {
    pub fn new(title: &str) -> Self {
        Self {
            lines: vec![title.to_string()],
        }
    }

    pub fn section(&mut self, title: &str) {
        self.lines.push(String::new());
        self.lines.push(format!("{title}:"));
    }

    pub fn push_kv(&mut self, key: &str, value: impl Display) {
        self.lines.push(format!("  {key}: {value}"));
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

pub fn base_doctor_report(config: &AppConfig, binary_name: &str) -> DoctorReport {
    let mut report = DoctorReport::new("cwterm Doctor");
    report.push_kv("version", env!("CARGO_PKG_VERSION"));
    report.push_kv("binary", binary_name);
    report.push_kv("os", format!("{}/{}", env::consts::OS, env::consts::ARCH));

    let mut validated = config.clone();
    let validation_result = validated.validate();
    let resolved = validation_result
        .as_ref()
        .map(|_| &validated)
        .unwrap_or(config);

    report.section("Terminal");
    match terminal_size() {
        Ok((cols, rows)) => report.push_kv("size", format!("{cols}x{rows}")),
        Err(err) => report.push_kv("size", format!("error: {err}")),
    }
    if let Ok(term) = env::var("TERM") {
        report.push_kv("term", term);
    }
    if let Ok(colorterm) = env::var("COLORTERM") {
        report.push_kv("colorterm", colorterm);
    }
    if let Ok(term_program) = env::var("TERM_PROGRAM") {
        let version = env::var("TERM_PROGRAM_VERSION").unwrap_or_else(|_| "unknown".to_string());
        report.push_kv("term_program", format!("{term_program} ({version})"));
    }
    if env::var("NO_COLOR").is_ok() {
        report.push_kv("no_color", "set");
    }
    report.push_kv("color_mode", detect_color_mode());
    report.push_kv("key_release_events", detect_key_release_support());

    report.section("Config");
    match validation_result {
        Ok(()) => report.push_kv("validation", "ok"),
        Err(err) => report.push_kv("validation", format!("error: {err}")),
    }
    report.push_kv("input_mode", resolved.input_mode.label());
    report.push_kv("gap_seed_ratio", resolved.gap_seed_ratio);
    report.push_kv("word_gap_ratio", resolved.word_gap_ratio);
    report.push_kv("cluster_max_passes", resolved.cluster_max_passes);
    report.push_kv(
        "ratio_fallback",
        if resolved.no_ratio_fallback {
            "disabled"
        } else {
            "enabled"
        },
    );
    let logs_enabled = (resolved.logs || resolved.log_timings) && !resolved.no_logs;
    report.push_kv("logs", if logs_enabled { "enabled" } else { "disabled" });
    report.push_kv("log_file", log_file_path().display());
    report.push_kv("crash_log", crash_log_path().display());
    report.push_kv("trace_log", tracing_log_path().display());

    report.section("Environment");
    let overrides: Vec<&str> = ["CWTERM_LOGS", "CWTERM_NO_LOGS", "CWTERM_TRACE_LOG"]
        .into_iter()
        .filter(|name| env::var(name).is_ok())
        .collect();
    if overrides.is_empty() {
        report.push_kv("overrides", "none");
    } else {
        report.push_line("  overrides:");
        for name in overrides {
            report.push_line(format!("    - {name}"));
        }
    }

    report
}

fn detect_color_mode() -> String {
    if env::var("NO_COLOR").is_ok() {
        return "none (NO_COLOR)".to_string();
    }
    if let Ok(colorterm) = env::var("COLORTERM") {
        let value = colorterm.to_lowercase();
        if value == "truecolor" || value == "24bit" {
            return format!("truecolor (COLORTERM={colorterm})");
        }
    }
    if let Ok(term) = env::var("TERM") {
        let value = term.to_lowercase();
        if value.contains("256color") || value.contains("256-color") {
            return format!("256 (TERM={term})");
        }
        if value.contains("color") || value.contains("xterm") || value.contains("screen") {
            return format!("ansi (TERM={term})");
        }
        if value == "dumb" {
            return "none (TERM=dumb)".to_string();
        }
    }
    "ansi (default)".to_string()
}

/// Probe for kitty-protocol key release reporting. The query needs raw mode
/// to read the terminal's reply, so skip it entirely off-tty.
fn detect_key_release_support() -> String {
    use crossterm::terminal::{disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement};

    if !io::stdin().is_tty() {
        return "unknown (stdin is not a tty)".to_string();
    }
    if enable_raw_mode().is_err() {
        return "unknown (raw mode unavailable)".to_string();
    }
    let result = supports_keyboard_enhancement();
    let _ = disable_raw_mode();
    match result {
        Ok(true) => "yes".to_string(),
        Ok(false) => "no (mouse keying will be used)".to_string(),
        Err(err) => format!("error: {err}"),
    }
}
