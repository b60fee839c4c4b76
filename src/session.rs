//! Keying record model: timed press/release spans and the session log.
//!
//! A session is the chronological list of how long the key was held down or
//! left up. Insertion order is the transmission order, so the list is
//! append-only and any sorting for classification happens on projected copies.

use std::time::Instant;

/// One completed press or release interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpan {
    /// Elapsed time between the opening and closing transition.
    pub duration_ms: u64,
    /// `true` while the key was held (a dot or dash), `false` for a gap.
    pub on: bool,
}

impl KeySpan {
    pub fn signal(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            on: true,
        }
    }

    pub fn gap(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            on: false,
        }
    }
}

/// Append-only chronological record of one keying run.
#[derive(Debug, Clone, Default)]
pub struct Session {
    spans: Vec<KeySpan>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_spans(spans: impl IntoIterator<Item = KeySpan>) -> Self {
        Self {
            spans: spans.into_iter().collect(),
        }
    }

    pub fn push(&mut self, span: KeySpan) {
        self.spans.push(span);
    }

    pub fn spans(&self) -> &[KeySpan] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Durations of held spans, sorted ascending for clustering.
    pub fn signal_durations(&self) -> Vec<u64> {
        self.sorted_durations(true)
    }

    /// Durations of released spans, sorted ascending for clustering.
    pub fn gap_durations(&self) -> Vec<u64> {
        self.sorted_durations(false)
    }

    fn sorted_durations(&self, on: bool) -> Vec<u64> {
        let mut durations: Vec<u64> = self
            .spans
            .iter()
            .filter(|span| span.on == on)
            .map(|span| span.duration_ms)
            .collect();
        durations.sort_unstable();
        durations
    }
}

/// Turns raw key-down/key-up notifications into completed [`KeySpan`]s.
///
/// The first press only arms the clock; every later transition closes the
/// opposite phase. Out-of-order notifications (key repeat, a release with no
/// prior press) are dropped so recorded spans strictly alternate.
#[derive(Debug, Default)]
pub struct KeyTracker {
    last: Option<Transition>,
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    down: bool,
    at: Instant,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press. Returns the gap span it closes, if any.
    pub fn key_down(&mut self, at: Instant) -> Option<KeySpan> {
        match self.last {
            None => {
                self.last = Some(Transition { down: true, at });
                None
            }
            // Key repeat while held: keep the original press time.
            Some(Transition { down: true, .. }) => None,
            Some(Transition {
                down: false,
                at: since,
            }) => {
                self.last = Some(Transition { down: true, at });
                Some(KeySpan::gap(elapsed_ms(since, at)))
            }
        }
    }

    /// Record a release. Returns the signal span it closes, if any.
    pub fn key_up(&mut self, at: Instant) -> Option<KeySpan> {
        match self.last {
            // A release before any press has nothing to measure.
            None | Some(Transition { down: false, .. }) => None,
            Some(Transition {
                down: true,
                at: since,
            }) => {
                self.last = Some(Transition { down: false, at });
                Some(KeySpan::signal(elapsed_ms(since, at)))
            }
        }
    }

    pub fn is_down(&self) -> bool {
        matches!(self.last, Some(Transition { down: true, .. }))
    }
}

/// Millisecond delta; a regressed clock yields a zero-length span.
fn elapsed_ms(since: Instant, now: Instant) -> u64 {
    u64::try_from(now.saturating_duration_since(since).as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(base: Instant, offset_ms: u64) -> Instant {
        base + Duration::from_millis(offset_ms)
    }

    #[test]
    fn session_preserves_insertion_order() {
        let mut session = Session::new();
        session.push(KeySpan::signal(300));
        session.push(KeySpan::gap(100));
        session.push(KeySpan::signal(100));
        assert_eq!(session.len(), 3);
        assert_eq!(
            session.spans(),
            &[
                KeySpan::signal(300),
                KeySpan::gap(100),
                KeySpan::signal(100),
            ]
        );
    }

    #[test]
    fn projections_sort_without_reordering_the_session() {
        let session = Session::from_spans([
            KeySpan::signal(300),
            KeySpan::gap(700),
            KeySpan::signal(100),
            KeySpan::gap(100),
        ]);
        assert_eq!(session.signal_durations(), vec![100, 300]);
        assert_eq!(session.gap_durations(), vec![100, 700]);
        assert_eq!(session.spans()[0], KeySpan::signal(300));
    }

    #[test]
    fn first_press_only_arms_the_clock() {
        let base = Instant::now();
        let mut tracker = KeyTracker::new();
        assert_eq!(tracker.key_down(at(base, 0)), None);
        assert!(tracker.is_down());
    }

    #[test]
    fn transitions_close_the_opposite_phase() {
        let base = Instant::now();
        let mut tracker = KeyTracker::new();
        tracker.key_down(at(base, 0));
        assert_eq!(tracker.key_up(at(base, 120)), Some(KeySpan::signal(120)));
        assert_eq!(tracker.key_down(at(base, 420)), Some(KeySpan::gap(300)));
        assert_eq!(tracker.key_up(at(base, 460)), Some(KeySpan::signal(40)));
        assert!(!tracker.is_down());
    }

    #[test]
    fn key_repeat_keeps_the_original_press_time() {
        let base = Instant::now();
        let mut tracker = KeyTracker::new();
        tracker.key_down(at(base, 0));
        assert_eq!(tracker.key_down(at(base, 50)), None);
        assert_eq!(tracker.key_down(at(base, 90)), None);
        assert_eq!(tracker.key_up(at(base, 200)), Some(KeySpan::signal(200)));
    }

    #[test]
    fn stray_release_is_ignored() {
        let base = Instant::now();
        let mut tracker = KeyTracker::new();
        assert_eq!(tracker.key_up(at(base, 10)), None);
        tracker.key_down(at(base, 20));
        tracker.key_up(at(base, 60));
        assert_eq!(tracker.key_up(at(base, 90)), None);
        assert_eq!(tracker.key_down(at(base, 100)), Some(KeySpan::gap(40)));
    }

    #[test]
    fn identical_timestamps_yield_a_zero_length_span() {
        let base = Instant::now();
        let mut tracker = KeyTracker::new();
        tracker.key_down(at(base, 5));
        assert_eq!(tracker.key_up(at(base, 5)), Some(KeySpan::signal(0)));
    }

    #[test]
    fn clock_regression_clamps_to_zero() {
        let base = Instant::now();
        let mut tracker = KeyTracker::new();
        tracker.key_down(at(base, 100));
        assert_eq!(tracker.key_up(at(base, 40)), Some(KeySpan::signal(0)));
    }
}
