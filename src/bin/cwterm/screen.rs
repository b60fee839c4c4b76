//! Terminal output for the keying session.
//!
//! Raw mode is active while these run, so every line break is written as
//! `\r\n` and the status line redraws in place after a clear-line sequence.

use std::env;
use std::io::{self, Write};

use crossterm::terminal::size as terminal_size;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use cwterm::classify::GapPolicy;
use cwterm::decode::{DecodeError, Decoded};
use cwterm::KeySpan;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[90m";
const RED: &str = "\x1b[91m";
const GREEN: &str = "\x1b[92m";
const YELLOW: &str = "\x1b[93m";
const CYAN: &str = "\x1b[96m";

const CLEAR_LINE: &str = "\r\x1b[2K";

/// Print the startup banner with the active key bindings.
pub fn banner(out: &mut dyn Write, device_label: &str) -> io::Result<()> {
    let text = format_banner(use_color(), device_label);
    out.write_all(text.as_bytes())?;
    out.flush()
}

/// Print a one-line advisory, e.g. when auto mode falls back to the mouse.
pub fn notice(out: &mut dyn Write, text: &str) -> io::Result<()> {
    let line = format!("{}\r\n", paint(text, YELLOW, use_color()));
    out.write_all(line.as_bytes())?;
    out.flush()
}

/// Redraw the in-place status line after a key transition.
pub fn status(out: &mut dyn Write, spans: usize, last: Option<KeySpan>) -> io::Result<()> {
    let line = format_status(use_color(), spans, last, terminal_cols());
    out.write_all(line.as_bytes())?;
    out.flush()
}

/// Print a decode result: the glyph line, then the learned timing means.
pub fn decoded(out: &mut dyn Write, result: &Decoded) -> io::Result<()> {
    let text = format_decoded(use_color(), result);
    out.write_all(text.as_bytes())?;
    out.flush()
}

/// Print a decode failure without ending the session.
pub fn decode_error(out: &mut dyn Write, err: &DecodeError) -> io::Result<()> {
    let text = format_error(use_color(), err);
    out.write_all(text.as_bytes())?;
    out.flush()
}

fn format_banner(use_color: bool, device_label: &str) -> String {
    let mut output = String::new();
    output.push_str(&paint(&format!("cwterm v{VERSION}"), CYAN, use_color));
    output.push_str("\r\n");
    output.push_str(&format!(
        "key with the {device_label}: hold to mark, release to space\r\n"
    ));
    output.push_str("press c to decode, q or Esc to quit\r\n");
    output
}

fn format_status(use_color: bool, spans: usize, last: Option<KeySpan>, cols: usize) -> String {
    let text = fit_width(&status_text(spans, last), cols);
    format!("{CLEAR_LINE}{}", paint(&text, DIM, use_color))
}

fn format_decoded(use_color: bool, result: &Decoded) -> String {
    let mut output = String::from(CLEAR_LINE);
    output.push_str(&paint(&result.text, GREEN, use_color));
    output.push_str("\r\n");
    output.push_str(&paint(&means_line(result), DIM, use_color));
    output.push_str("\r\n");
    output
}

fn format_error(use_color: bool, err: &DecodeError) -> String {
    format!(
        "{CLEAR_LINE}{}\r\n",
        paint(&format!("decode failed: {err}"), RED, use_color)
    )
}

fn status_text(spans: usize, last: Option<KeySpan>) -> String {
    match last {
        Some(span) => format!(
            "spans {} | last {} {} ms",
            spans,
            if span.on { "press" } else { "gap" },
            span.duration_ms
        ),
        None => format!("spans {spans}"),
    }
}

fn means_line(result: &Decoded) -> String {
    let signal = result.signal;
    let gaps = result.gaps;
    let policy = match gaps.policy {
        GapPolicy::Adaptive => "adaptive gaps",
        GapPolicy::FixedRatio => "fixed-ratio fallback",
    };
    let approx = if signal.converged && gaps.converged {
        ""
    } else {
        " (approximate)"
    };
    format!(
        "dot {} ms | dash {} ms | gaps {}/{}/{} ms | {policy}{approx}",
        signal.dot_ms, signal.dash_ms, gaps.element_ms, gaps.char_ms, gaps.word_ms
    )
}

fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{color}{text}{RESET}")
    } else {
        text.to_string()
    }
}

fn use_color() -> bool {
    env::var_os("NO_COLOR").is_none()
}

/// Truncate to the terminal width, marking the cut with an ellipsis.
fn fit_width(text: &str, max_cols: usize) -> String {
    if max_cols == 0 {
        return String::new();
    }
    if UnicodeWidthStr::width(text) <= max_cols {
        return text.to_string();
    }
    let budget = max_cols.saturating_sub(1);
    let mut result = String::new();
    let mut width: usize = 0;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width.saturating_add(ch_width) > budget {
            break;
        }
        result.push(ch);
        width = width.saturating_add(ch_width);
    }
    result.push('…');
    result
}

fn terminal_cols() -> usize {
    terminal_size().map(|(cols, _)| cols as usize).unwrap_or(80)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cwterm::classify::{GapMeans, SignalMeans};

    fn sample_decoded(policy: GapPolicy, gaps_converged: bool) -> Decoded {
        Decoded {
            text: ". .|->".to_string(),
            symbols: Vec::new(),
            signal: SignalMeans {
                dot_ms: 100,
                dash_ms: 300,
                passes: 1,
                converged: true,
            },
            gaps: GapMeans {
                element_ms: 100,
                char_ms: 300,
                word_ms: 700,
                passes: 1,
                converged: gaps_converged,
                policy,
            },
        }
    }

    #[test]
    fn status_text_reports_the_last_span() {
        assert_eq!(
            status_text(3, Some(KeySpan::signal(120))),
            "spans 3 | last press 120 ms"
        );
        assert_eq!(
            status_text(4, Some(KeySpan::gap(80))),
            "spans 4 | last gap 80 ms"
        );
        assert_eq!(status_text(0, None), "spans 0");
    }

    #[test]
    fn format_status_redraws_in_place() {
        let line = format_status(false, 2, Some(KeySpan::signal(90)), 80);
        assert!(line.starts_with("\r\u{1b}[2K"));
        assert!(line.contains("spans 2 | last press 90 ms"));
        assert!(!line.ends_with('\n'));
    }

    #[test]
    fn format_banner_lists_the_key_bindings() {
        let text = format_banner(false, "mouse button");
        assert!(text.contains("cwterm v"));
        assert!(text.contains("key with the mouse button"));
        assert!(text.contains("press c to decode, q or Esc to quit"));
        // Raw mode needs explicit carriage returns.
        assert!(!text.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn format_banner_colors_the_title() {
        let text = format_banner(true, "space bar");
        assert!(text.contains("\u{1b}[96m"));
        assert!(text.contains("\u{1b}[0m"));
    }

    #[test]
    fn means_line_names_the_gap_policy() {
        assert_eq!(
            means_line(&sample_decoded(GapPolicy::Adaptive, true)),
            "dot 100 ms | dash 300 ms | gaps 100/300/700 ms | adaptive gaps"
        );
        assert_eq!(
            means_line(&sample_decoded(GapPolicy::FixedRatio, true)),
            "dot 100 ms | dash 300 ms | gaps 100/300/700 ms | fixed-ratio fallback"
        );
    }

    #[test]
    fn means_line_flags_unconverged_estimates() {
        let line = means_line(&sample_decoded(GapPolicy::Adaptive, false));
        assert!(line.ends_with(" (approximate)"));
    }

    #[test]
    fn format_decoded_prints_glyphs_then_means() {
        let text = format_decoded(false, &sample_decoded(GapPolicy::Adaptive, true));
        assert_eq!(
            text,
            "\r\u{1b}[2K. .|->\r\ndot 100 ms | dash 300 ms | gaps 100/300/700 ms | adaptive gaps\r\n"
        );
        let colored = format_decoded(true, &sample_decoded(GapPolicy::Adaptive, true));
        assert!(colored.contains("\u{1b}[92m"));
    }

    #[test]
    fn fit_width_truncates_with_an_ellipsis() {
        assert_eq!(fit_width("hello", 10), "hello");
        assert_eq!(fit_width("hello world", 8), "hello w…");
        assert_eq!(fit_width("hi", 0), "");
    }

    #[test]
    fn decode_error_writes_the_failure() {
        use cwterm::cluster::ClusterError;
        let mut buf = Vec::new();
        let err = DecodeError::Signal(ClusterError::InsufficientData {
            required: 2,
            distinct: 1,
        });
        decode_error(&mut buf, &err).unwrap();
        let output = String::from_utf8_lossy(&buf);
        assert!(output.contains("decode failed"));
        assert!(output.contains("signal clustering"));
    }
}
