//! Full session decode: learn thresholds, label every span, render text.
//!
//! Press and release durations are clustered independently. A session too
//! thin to learn gap tiers from can still decode by riding the signal means
//! at fixed ratios; a session whose presses cannot be told apart cannot.

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::classify::{self, GapMeans, SignalMeans};
use crate::cluster::ClusterError;
use crate::config::{DEFAULT_CLUSTER_MAX_PASSES, DEFAULT_GAP_SEED_RATIO, DEFAULT_WORD_GAP_RATIO};
use crate::logging;
use crate::session::{KeySpan, Session};

/// One decoded span. Gaps that sit exactly between two tiers get no symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    Dot,
    Dash,
    ElementGap,
    CharGap,
    WordGap,
}

impl Symbol {
    pub fn glyph(self) -> char {
        match self {
            Symbol::Dot => '.',
            Symbol::Dash => '-',
            Symbol::ElementGap => ' ',
            Symbol::CharGap => '|',
            Symbol::WordGap => '>',
        }
    }
}

/// Tuning knobs for one decode run.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    pub gap_seed_ratio: u64,
    pub word_gap_ratio: u64,
    pub max_passes: u32,
    /// Allow fixed-ratio gap tiers when the session has too few distinct gaps.
    pub ratio_fallback: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            gap_seed_ratio: DEFAULT_GAP_SEED_RATIO,
            word_gap_ratio: DEFAULT_WORD_GAP_RATIO,
            max_passes: DEFAULT_CLUSTER_MAX_PASSES,
            ratio_fallback: true,
        }
    }
}

/// Decode result plus the thresholds that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decoded {
    pub text: String,
    /// One entry per session span, in order. `None` marks an unresolved gap.
    pub symbols: Vec<Option<Symbol>>,
    pub signal: SignalMeans,
    pub gaps: GapMeans,
}

/// Which clustering stage refused the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("signal clustering: {0}")]
    Signal(ClusterError),
    #[error("gap clustering: {0}")]
    Gap(ClusterError),
}

/// Learn thresholds from `session` and decode it.
///
/// Gap clustering that fails for lack of distinct durations falls back to
/// [`classify::ratio_gap_means`] when `opts.ratio_fallback` allows it. Any
/// other failure, including anything on the signal side, is returned as-is.
pub fn decode_session(session: &Session, opts: &DecodeOptions) -> Result<Decoded, DecodeError> {
    let signal = classify::signal_means(&session.signal_durations(), opts.max_passes)
        .map_err(DecodeError::Signal)?;

    let gaps = match classify::adaptive_gap_means(
        &session.gap_durations(),
        opts.gap_seed_ratio,
        opts.max_passes,
    ) {
        Ok(gaps) => gaps,
        Err(err @ ClusterError::InsufficientData { .. }) if opts.ratio_fallback => {
            logging::log_debug(&format!("gap clustering fell back to fixed ratios: {err}"));
            classify::ratio_gap_means(&signal, opts.word_gap_ratio)
        }
        Err(err) => return Err(DecodeError::Gap(err)),
    };

    let symbols = classify_spans(session.spans(), &signal, &gaps);
    let text = render(&symbols);
    let decoded = Decoded {
        text,
        symbols,
        signal,
        gaps,
    };

    log_decode_metrics(session.len(), &decoded);
    if let Ok(report) = serde_json::to_string(&decoded) {
        logging::log_debug(&format!("decode_report|{report}"));
    }
    info!(
        spans = session.len(),
        chars = decoded.text.chars().count(),
        gap_policy = gaps.policy.label(),
        "decode complete"
    );
    Ok(decoded)
}

/// Emit structured metrics for one decode.
/// Format: `decode_metrics|spans=...|chars=...|dot_ms=...|dash_ms=...|element_ms=...|char_ms=...|word_ms=...|gap_policy=...|converged=...`
pub(crate) fn log_decode_metrics(spans: usize, decoded: &Decoded) {
    logging::log_debug(&format!(
        "decode_metrics|spans={}|chars={}|dot_ms={}|dash_ms={}|element_ms={}|char_ms={}|word_ms={}|gap_policy={}|converged={}",
        spans,
        decoded.text.chars().count(),
        decoded.signal.dot_ms,
        decoded.signal.dash_ms,
        decoded.gaps.element_ms,
        decoded.gaps.char_ms,
        decoded.gaps.word_ms,
        decoded.gaps.policy.label(),
        decoded.signal.converged && decoded.gaps.converged
    ));
}

fn classify_spans(spans: &[KeySpan], signal: &SignalMeans, gaps: &GapMeans) -> Vec<Option<Symbol>> {
    spans
        .iter()
        .map(|span| {
            if span.on {
                Some(classify_signal(span.duration_ms, signal))
            } else {
                classify_gap(span.duration_ms, gaps)
            }
        })
        .collect()
}

/// Dot wins the exact midpoint; a proper dash is never that short.
fn classify_signal(duration_ms: u64, signal: &SignalMeans) -> Symbol {
    if duration_ms.abs_diff(signal.dot_ms) <= duration_ms.abs_diff(signal.dash_ms) {
        Symbol::Dot
    } else {
        Symbol::Dash
    }
}

/// Strictly nearest tier, or `None` when two tiers are equally close.
fn classify_gap(duration_ms: u64, gaps: &GapMeans) -> Option<Symbol> {
    let to_element = duration_ms.abs_diff(gaps.element_ms);
    let to_char = duration_ms.abs_diff(gaps.char_ms);
    let to_word = duration_ms.abs_diff(gaps.word_ms);
    if to_element < to_char && to_element < to_word {
        Some(Symbol::ElementGap)
    } else if to_char < to_element && to_char < to_word {
        Some(Symbol::CharGap)
    } else if to_word < to_element && to_word < to_char {
        Some(Symbol::WordGap)
    } else {
        None
    }
}

fn render(symbols: &[Option<Symbol>]) -> String {
    symbols.iter().flatten().map(|symbol| symbol.glyph()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::GapPolicy;

    fn opts() -> DecodeOptions {
        DecodeOptions::default()
    }

    fn well_spaced_session() -> Session {
        Session::from_spans(vec![
            KeySpan::signal(100),
            KeySpan::gap(100),
            KeySpan::signal(100),
            KeySpan::gap(300),
            KeySpan::signal(300),
            KeySpan::gap(700),
        ])
    }

    #[test]
    fn well_spaced_keying_decodes_adaptively() {
        let decoded = decode_session(&well_spaced_session(), &opts()).unwrap();
        assert_eq!(decoded.text, ". .|->");
        assert_eq!(decoded.symbols.len(), 6);
        assert_eq!(decoded.signal.dot_ms, 100);
        assert_eq!(decoded.signal.dash_ms, 300);
        assert_eq!(decoded.gaps.policy, GapPolicy::Adaptive);
        assert_eq!(
            (decoded.gaps.element_ms, decoded.gaps.char_ms, decoded.gaps.word_ms),
            (100, 300, 700)
        );
    }

    #[test]
    fn thin_gaps_fall_back_to_fixed_ratios() {
        let session = Session::from_spans(vec![
            KeySpan::signal(100),
            KeySpan::gap(100),
            KeySpan::signal(300),
            KeySpan::gap(700),
            KeySpan::signal(300),
        ]);
        let decoded = decode_session(&session, &opts()).unwrap();
        assert_eq!(decoded.gaps.policy, GapPolicy::FixedRatio);
        assert_eq!(decoded.gaps.element_ms, 100);
        assert_eq!(decoded.gaps.char_ms, 300);
        assert_eq!(decoded.gaps.word_ms, 700);
        assert_eq!(decoded.text, ". ->-");
    }

    #[test]
    fn fallback_can_be_disabled() {
        let session = Session::from_spans(vec![
            KeySpan::signal(100),
            KeySpan::gap(100),
            KeySpan::signal(300),
            KeySpan::gap(700),
            KeySpan::signal(300),
        ]);
        let err = decode_session(
            &session,
            &DecodeOptions {
                ratio_fallback: false,
                ..opts()
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            DecodeError::Gap(ClusterError::InsufficientData {
                required: 3,
                distinct: 2,
            })
        );
    }

    #[test]
    fn degenerate_gaps_never_fall_back() {
        // Three distinct gaps, so seeding succeeds, but they are compressed
        // enough that the middle seed (3x the shortest) overshoots the
        // largest gap and the partition leaves a group empty. That failure
        // is terminal even with the ratio fallback enabled.
        let session = Session::from_spans(vec![
            KeySpan::signal(100),
            KeySpan::gap(100),
            KeySpan::signal(300),
            KeySpan::gap(150),
            KeySpan::signal(100),
            KeySpan::gap(200),
        ]);
        let err = decode_session(&session, &opts()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Gap(ClusterError::DegenerateBorder {
                group: 1,
                borders: vec![3, 0],
                len: 3,
            })
        );
    }

    #[test]
    fn uniform_presses_never_fall_back() {
        let session = Session::from_spans(vec![
            KeySpan::signal(100),
            KeySpan::gap(100),
            KeySpan::signal(100),
            KeySpan::gap(300),
            KeySpan::signal(100),
            KeySpan::gap(700),
        ]);
        let err = decode_session(&session, &opts()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Signal(ClusterError::InsufficientData {
                required: 2,
                distinct: 1,
            })
        );
    }

    #[test]
    fn midpoint_presses_count_as_dots() {
        let signal = SignalMeans {
            dot_ms: 100,
            dash_ms: 300,
            passes: 1,
            converged: true,
        };
        assert_eq!(classify_signal(200, &signal), Symbol::Dot);
        assert_eq!(classify_signal(201, &signal), Symbol::Dash);
        assert_eq!(classify_signal(199, &signal), Symbol::Dot);
    }

    #[test]
    fn equidistant_gaps_have_no_tier() {
        let gaps = GapMeans {
            element_ms: 100,
            char_ms: 300,
            word_ms: 700,
            passes: 1,
            converged: true,
            policy: GapPolicy::Adaptive,
        };
        assert_eq!(classify_gap(200, &gaps), None);
        assert_eq!(classify_gap(500, &gaps), None);
        assert_eq!(classify_gap(150, &gaps), Some(Symbol::ElementGap));
        assert_eq!(classify_gap(250, &gaps), Some(Symbol::CharGap));
        assert_eq!(classify_gap(5_000, &gaps), Some(Symbol::WordGap));
    }

    #[test]
    fn unresolved_gaps_keep_their_slot_but_render_nothing() {
        let signal = SignalMeans {
            dot_ms: 100,
            dash_ms: 300,
            passes: 1,
            converged: true,
        };
        let gaps = GapMeans {
            element_ms: 100,
            char_ms: 300,
            word_ms: 700,
            passes: 1,
            converged: true,
            policy: GapPolicy::Adaptive,
        };
        let spans = [KeySpan::signal(100), KeySpan::gap(200), KeySpan::signal(300)];
        let symbols = classify_spans(&spans, &signal, &gaps);
        assert_eq!(symbols, vec![Some(Symbol::Dot), None, Some(Symbol::Dash)]);
        assert_eq!(render(&symbols), ".-");
    }

    #[test]
    fn scaling_the_session_preserves_the_glyph_stream() {
        let base = decode_session(&well_spaced_session(), &opts()).unwrap();
        let scaled_session = Session::from_spans(well_spaced_session().spans().iter().map(
            |span| KeySpan {
                duration_ms: span.duration_ms * 3,
                on: span.on,
            },
        ));
        let scaled = decode_session(&scaled_session, &opts()).unwrap();
        assert_eq!(scaled.text, base.text);
        assert_eq!(scaled.signal.dot_ms, base.signal.dot_ms * 3);
        assert_eq!(scaled.gaps.word_ms, base.gaps.word_ms * 3);
    }

    #[test]
    fn decode_report_serializes_the_policy() {
        let decoded = decode_session(&well_spaced_session(), &opts()).unwrap();
        let report = serde_json::to_string(&decoded).unwrap();
        assert!(report.contains("\"policy\":\"adaptive\""));
        assert!(report.contains("\"text\":\". .|->\""));
    }
}
