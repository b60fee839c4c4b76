//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use clap::{Parser, ValueEnum};

use defaults::default_input_mode;
pub use defaults::{
    DEFAULT_CLUSTER_MAX_PASSES, DEFAULT_GAP_SEED_RATIO, DEFAULT_WORD_GAP_RATIO,
    MAX_CLUSTER_PASS_LIMIT, MAX_GAP_SEED_RATIO, MAX_WORD_GAP_RATIO, MIN_GAP_SEED_RATIO,
    MIN_WORD_GAP_RATIO,
};

/// CLI options for the cwterm trainer. Validated values feed the decode pipeline directly.
#[derive(Debug, Parser, Clone)]
#[command(about = "Adaptive Morse keying trainer for the terminal", author, version)]
pub struct AppConfig {
    /// Keying device to capture (auto probes for key-release support)
    #[arg(long = "input-mode", value_enum, default_value_t = default_input_mode())]
    pub input_mode: InputMode,

    /// Middle gap seed as a multiple of the shortest observed gap
    #[arg(long = "gap-seed-ratio", default_value_t = DEFAULT_GAP_SEED_RATIO)]
    pub gap_seed_ratio: u64,

    /// Word gap threshold as a multiple of the dot mean (fixed-ratio decodes)
    #[arg(long = "word-gap-ratio", default_value_t = DEFAULT_WORD_GAP_RATIO)]
    pub word_gap_ratio: u64,

    /// Refinement passes allowed before a cluster run is declared approximate
    #[arg(long = "cluster-max-passes", default_value_t = DEFAULT_CLUSTER_MAX_PASSES)]
    pub cluster_max_passes: u32,

    /// Fail instead of deriving gap thresholds from the signal means
    #[arg(long = "no-ratio-fallback")]
    pub no_ratio_fallback: bool,

    /// Print environment diagnostics and exit
    #[arg(long = "doctor", default_value_t = false)]
    pub doctor: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "CWTERM_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "CWTERM_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Enable verbose timing logs
    #[arg(long)]
    pub log_timings: bool,
}

/// Available keying devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputMode {
    Auto,
    Mouse,
    Key,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            InputMode::Auto => "auto",
            InputMode::Mouse => "mouse",
            InputMode::Key => "key",
        }
    }
}
