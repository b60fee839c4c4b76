//! Keying events and the sources that produce them.
//!
//! The event loop is written against [`EventSource`] so the interactive
//! terminal reader and scripted playback share the same loop.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use anyhow::Result;

/// One step of a keying session, timestamped where timing matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyerEvent {
    Down(Instant),
    Up(Instant),
    /// Decode everything keyed so far and show the result.
    Decode,
    Quit,
}

/// Blocking producer of keyer events.
pub trait EventSource {
    fn next_event(&mut self) -> Result<KeyerEvent>;
}

/// Replays a fixed event list, then quits forever.
pub struct ScriptedSource {
    events: VecDeque<KeyerEvent>,
}

impl ScriptedSource {
    pub fn new(events: Vec<KeyerEvent>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

impl EventSource for ScriptedSource {
    fn next_event(&mut self) -> Result<KeyerEvent> {
        Ok(self.events.pop_front().unwrap_or(KeyerEvent::Quit))
    }
}

/// Build a down/up timeline from `(press_ms, gap_ms)` pairs, ending with a
/// decode request. The final pair's gap only positions a press that never
/// comes, so it can be zero.
pub fn scripted_keying(pairs: &[(u64, u64)]) -> Vec<KeyerEvent> {
    let mut events = Vec::with_capacity(pairs.len() * 2 + 2);
    let mut at = Instant::now();
    for &(press_ms, gap_ms) in pairs {
        events.push(KeyerEvent::Down(at));
        at += Duration::from_millis(press_ms);
        events.push(KeyerEvent::Up(at));
        at += Duration::from_millis(gap_ms);
    }
    events.push(KeyerEvent::Decode);
    events.push(KeyerEvent::Quit);
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{KeyTracker, Session};

    #[test]
    fn scripted_timeline_reconstructs_the_session() {
        let mut source = ScriptedSource::new(scripted_keying(&[(100, 100), (100, 300), (300, 0)]));
        let mut tracker = KeyTracker::new();
        let mut session = Session::new();
        loop {
            match source.next_event().unwrap() {
                KeyerEvent::Down(at) => {
                    if let Some(gap) = tracker.key_down(at) {
                        session.push(gap);
                    }
                }
                KeyerEvent::Up(at) => {
                    if let Some(signal) = tracker.key_up(at) {
                        session.push(signal);
                    }
                }
                KeyerEvent::Decode => {}
                KeyerEvent::Quit => break,
            }
        }
        assert_eq!(session.len(), 5);
        assert_eq!(session.signal_durations(), vec![100, 100, 300]);
        assert_eq!(session.gap_durations(), vec![100, 300]);
    }

    #[test]
    fn scripted_keying_ends_with_a_decode_request() {
        let events = scripted_keying(&[(100, 100)]);
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], KeyerEvent::Down(_)));
        assert!(matches!(events[1], KeyerEvent::Up(_)));
        assert_eq!(events[2], KeyerEvent::Decode);
        assert_eq!(events[3], KeyerEvent::Quit);
    }

    #[test]
    fn exhausted_source_keeps_yielding_quit() {
        let mut source = ScriptedSource::new(Vec::new());
        assert_eq!(source.next_event().unwrap(), KeyerEvent::Quit);
        assert_eq!(source.next_event().unwrap(), KeyerEvent::Quit);
    }
}
