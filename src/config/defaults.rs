//! Default values and hard limits for CLI options.

use super::InputMode;

/// Middle gap seed multiplier: one dash-length of silence marks a character
/// boundary in conventional spacing.
pub const DEFAULT_GAP_SEED_RATIO: u64 = 3;
pub const MIN_GAP_SEED_RATIO: u64 = 2;
pub const MAX_GAP_SEED_RATIO: u64 = 10;

/// Word gaps sit at seven dots in conventional spacing.
pub const DEFAULT_WORD_GAP_RATIO: u64 = 7;
pub const MIN_WORD_GAP_RATIO: u64 = 4;
pub const MAX_WORD_GAP_RATIO: u64 = 30;

/// Generous pass budget; real sessions settle within a handful of passes.
pub const DEFAULT_CLUSTER_MAX_PASSES: u32 = 10_000;
pub const MAX_CLUSTER_PASS_LIMIT: u32 = 1_000_000;

pub fn default_input_mode() -> InputMode {
    InputMode::Auto
}
