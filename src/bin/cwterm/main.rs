//! cwterm entrypoint: a raw-mode straight-key trainer.
//!
//! Captures press/release spans from the mouse button (or the space bar on
//! terminals that report key releases), learns the operator's own dot, dash
//! and gap timing by clustering the observed durations, and renders the
//! decoded glyph stream on demand.

mod event_loop;
mod input;
mod screen;
mod session_stats;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::terminal::supports_keyboard_enhancement;
use std::io::{self, Write};

use cwterm::config::{AppConfig, InputMode};
use cwterm::doctor::base_doctor_report;
use cwterm::telemetry::init_tracing;
use cwterm::terminal_restore::TerminalRestoreGuard;
use cwterm::{init_logging, log_debug, log_file_path};

use crate::event_loop::run_event_loop;
use crate::input::{KeyingDevice, TerminalSource};
use crate::session_stats::{format_session_stats, SessionStats};

fn main() -> Result<()> {
    let mut config = AppConfig::parse();
    if config.doctor {
        let report = base_doctor_report(&config, "cwterm");
        println!("{}", report.render());
        return Ok(());
    }

    config.validate()?;
    init_logging(&config);
    init_tracing(&config);
    let log_path = log_file_path();
    log_debug("=== cwterm Started ===");
    log_debug(&format!("Log file: {log_path:?}"));

    let guard = TerminalRestoreGuard::new();
    guard
        .enable_raw_mode()
        .context("failed to enable raw mode")?;
    let mut stdout = io::stdout();

    // The probe talks to the terminal, so it has to run after raw mode is on.
    let key_release_supported = supports_keyboard_enhancement().unwrap_or(false);
    let device = match config.input_mode {
        InputMode::Mouse => KeyingDevice::Mouse,
        InputMode::Key => {
            if !key_release_supported {
                bail!(
                    "--input-mode key needs a terminal that reports key releases (try --input-mode mouse)"
                );
            }
            KeyingDevice::SpaceBar
        }
        InputMode::Auto => {
            if key_release_supported {
                KeyingDevice::SpaceBar
            } else {
                KeyingDevice::Mouse
            }
        }
    };
    match device {
        KeyingDevice::SpaceBar => guard.enable_key_release_events(&mut stdout)?,
        KeyingDevice::Mouse => guard.enable_mouse_capture(&mut stdout)?,
    }
    log_debug(&format!("keying device: {}", device.label()));

    screen::banner(&mut stdout, device.label())?;
    if config.input_mode == InputMode::Auto && !key_release_supported {
        screen::notice(
            &mut stdout,
            "key-release reporting unavailable; using the mouse button as the key",
        )?;
    }

    let mut stats = SessionStats::new();
    let mut source = TerminalSource::new(device);
    let result = run_event_loop(&mut source, &config, &mut stdout, &mut stats);

    guard.restore();
    let session = result?;
    log_debug(&format!("session ended with {} spans", session.len()));
    let stats_output = format_session_stats(&stats);
    if !stats_output.is_empty() {
        print!("{stats_output}");
        let _ = io::stdout().flush();
    }
    log_debug("=== cwterm Exiting ===");
    Ok(())
}
