//! Turns clustered durations into keying thresholds.
//!
//! Signals always get two groups (dot, dash). Gaps get three (element,
//! character, word), either learned from the session or derived from the
//! signal means when the session is too thin to learn from.

use serde::Serialize;

use crate::cluster::{self, ClusterConfig, ClusterError};

/// How the gap thresholds were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Clustered from the session's own gap durations.
    Adaptive,
    /// Fixed ratios over the signal means.
    FixedRatio,
}

impl GapPolicy {
    pub fn label(self) -> &'static str {
        match self {
            GapPolicy::Adaptive => "adaptive",
            GapPolicy::FixedRatio => "fixed-ratio",
        }
    }
}

/// Learned dot/dash means for press durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignalMeans {
    pub dot_ms: u64,
    pub dash_ms: u64,
    pub passes: u32,
    pub converged: bool,
}

/// Learned (or derived) gap means for release durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GapMeans {
    pub element_ms: u64,
    pub char_ms: u64,
    pub word_ms: u64,
    pub passes: u32,
    pub converged: bool,
    pub policy: GapPolicy,
}

/// Cluster sorted press durations into dot and dash means.
///
/// Seeds are the observed extremes, so the groups can only tighten inward.
pub fn signal_means(durations: &[u64], max_passes: u32) -> Result<SignalMeans, ClusterError> {
    let (Some(&lo), Some(&hi)) = (durations.first(), durations.last()) else {
        return Err(ClusterError::InsufficientData {
            required: 2,
            distinct: 0,
        });
    };
    let outcome = cluster::refine(
        durations,
        &ClusterConfig {
            seeds: vec![lo, hi],
            max_passes,
        },
    )?;
    Ok(SignalMeans {
        dot_ms: outcome.means[0],
        dash_ms: outcome.means[1],
        passes: outcome.passes,
        converged: outcome.converged,
    })
}

/// Cluster sorted release durations into element, character and word means.
///
/// The middle seed sits at `gap_seed_ratio` times the shortest gap, which
/// matches the conventional dash-to-dot spacing and keeps the middle group
/// from collapsing into either extreme on well-spaced keying.
pub fn adaptive_gap_means(
    durations: &[u64],
    gap_seed_ratio: u64,
    max_passes: u32,
) -> Result<GapMeans, ClusterError> {
    let (Some(&lo), Some(&hi)) = (durations.first(), durations.last()) else {
        return Err(ClusterError::InsufficientData {
            required: 3,
            distinct: 0,
        });
    };
    let outcome = cluster::refine(
        durations,
        &ClusterConfig {
            seeds: vec![lo, lo.saturating_mul(gap_seed_ratio), hi],
            max_passes,
        },
    )?;
    Ok(GapMeans {
        element_ms: outcome.means[0],
        char_ms: outcome.means[1],
        word_ms: outcome.means[2],
        passes: outcome.passes,
        converged: outcome.converged,
        policy: GapPolicy::Adaptive,
    })
}

/// Derive gap means from the signal means at fixed ratios.
///
/// Element gaps ride the dot mean, character gaps the dash mean, and word
/// gaps sit at `word_gap_ratio` dots, per conventional Morse spacing.
pub fn ratio_gap_means(signal: &SignalMeans, word_gap_ratio: u64) -> GapMeans {
    GapMeans {
        element_ms: signal.dot_ms,
        char_ms: signal.dash_ms,
        word_ms: signal.dot_ms.saturating_mul(word_gap_ratio),
        passes: 0,
        converged: true,
        policy: GapPolicy::FixedRatio,
    }
}
