//! Core runtime loop that turns key transitions into session spans and
//! decodes the session on demand.

use std::io::Write;
use std::time::Instant;

use anyhow::Result;

use cwterm::classify::GapPolicy;
use cwterm::config::AppConfig;
use cwterm::decode::{decode_session, DecodeOptions};
use cwterm::{log_debug, EventSource, KeyTracker, KeyerEvent, Session};

use crate::screen;
use crate::session_stats::SessionStats;

pub(crate) fn run_event_loop(
    source: &mut dyn EventSource,
    config: &AppConfig,
    out: &mut dyn Write,
    stats: &mut SessionStats,
) -> Result<Session> {
    let opts = config.decode_options();
    let mut tracker = KeyTracker::new();
    let mut session = Session::new();
    let mut running = true;
    while running {
        match source.next_event()? {
            KeyerEvent::Down(at) => {
                if let Some(gap) = tracker.key_down(at) {
                    session.push(gap);
                    stats.record_gap();
                }
                screen::status(out, session.len(), session.spans().last().copied())?;
            }
            KeyerEvent::Up(at) => {
                if let Some(signal) = tracker.key_up(at) {
                    session.push(signal);
                    stats.record_signal();
                }
                screen::status(out, session.len(), session.spans().last().copied())?;
            }
            KeyerEvent::Decode => decode_once(&session, &opts, config, out, stats)?,
            KeyerEvent::Quit => running = false,
        }
    }
    Ok(session)
}

fn decode_once(
    session: &Session,
    opts: &DecodeOptions,
    config: &AppConfig,
    out: &mut dyn Write,
    stats: &mut SessionStats,
) -> Result<()> {
    let started = Instant::now();
    match decode_session(session, opts) {
        Ok(decoded) => {
            if config.log_timings {
                log_debug(&format!(
                    "decode timing: {} spans in {} ms",
                    session.len(),
                    started.elapsed().as_millis()
                ));
            }
            stats.record_decode(decoded.gaps.policy == GapPolicy::FixedRatio);
            screen::decoded(out, &decoded)?;
        }
        Err(err) => {
            stats.record_failed_decode();
            screen::decode_error(out, &err)?;
        }
    }
    Ok(())
}
