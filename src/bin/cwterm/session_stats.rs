//! Session statistics tracking.
//!
//! Tracks keying and decode statistics during a session and formats them for
//! display on exit.

use std::time::{Duration, Instant};

/// Statistics for a keying session.
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Number of key presses (signal spans)
    pub signals: u32,
    /// Number of gaps between presses
    pub gaps: u32,
    /// Number of successful decodes
    pub decodes: u32,
    /// Decodes that used the fixed-ratio gap fallback
    pub fallback_decodes: u32,
    /// Decodes that failed outright
    pub failed_decodes: u32,
    /// Session start time
    start_time: Option<Instant>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Record one press span.
    pub fn record_signal(&mut self) {
        self.signals += 1;
    }

    /// Record one gap span.
    pub fn record_gap(&mut self) {
        self.gaps += 1;
    }

    /// Record a successful decode.
    pub fn record_decode(&mut self, used_fallback: bool) {
        self.decodes += 1;
        if used_fallback {
            self.fallback_decodes += 1;
        }
    }

    /// Record a decode that returned an error.
    pub fn record_failed_decode(&mut self) {
        self.failed_decodes += 1;
    }

    /// Get session duration.
    pub fn session_duration(&self) -> Duration {
        self.start_time
            .map(|start| start.elapsed())
            .unwrap_or_default()
    }

    /// Check if any activity occurred.
    pub fn has_activity(&self) -> bool {
        self.signals > 0 || self.decodes > 0 || self.failed_decodes > 0
    }
}

/// Format session stats for display on exit.
pub fn format_session_stats(stats: &SessionStats) -> String {
    if !stats.has_activity() {
        return String::new();
    }

    let mut lines = vec![
        String::new(), // Empty line before
        "Session Summary".to_string(),
        "───────────────".to_string(),
        format_stat_line("Key presses", &stats.signals.to_string()),
        format_stat_line("Spans", &(stats.signals + stats.gaps).to_string()),
        format_stat_line("Decodes", &stats.decodes.to_string()),
    ];

    // Fallback decodes (if any)
    if stats.fallback_decodes > 0 {
        lines.push(format_stat_line(
            "Ratio fallback",
            &stats.fallback_decodes.to_string(),
        ));
    }

    // Failed decodes (if any)
    if stats.failed_decodes > 0 {
        lines.push(format_stat_line(
            "Failed decodes",
            &stats.failed_decodes.to_string(),
        ));
    }

    // Session duration
    let session_dur = format_duration(stats.session_duration().as_secs_f32());
    lines.push(format_stat_line("Session", &session_dur));

    lines.push(String::new()); // Empty line after

    lines.join("\n")
}

fn format_stat_line(label: &str, value: &str) -> String {
    format!("{:<14} {}", label, value)
}

fn format_duration(secs: f32) -> String {
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else if secs < 3600.0 {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins as u32, remaining_secs)
    } else {
        let hours = (secs / 3600.0).floor();
        let remaining_mins = ((secs % 3600.0) / 60.0).floor();
        format!("{}h {}m", hours as u32, remaining_mins as u32)
    }
}
