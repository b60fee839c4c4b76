//! 1-D cluster refinement over sorted duration samples.
//!
//! The engine repeatedly splits a sorted slice at the points where values
//! switch from being closer to one mean to being closer to the next, then
//! recomputes each group's integer mean, until the means stop moving. The
//! single left-to-right scan is only valid because the input is sorted and
//! the means stay ordered; it is not a general k-means step.

use thiserror::Error;
use tracing::trace;

/// Seeds and pass budget for one refinement run.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Initial means, ascending. One group per seed.
    pub seeds: Vec<u64>,
    /// Passes before the run is declared approximate.
    pub max_passes: u32,
}

/// Stable (or last-computed) means plus how the run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterOutcome {
    /// One mean per group, ascending.
    pub means: Vec<u64>,
    /// Split indices between adjacent groups; group `i` covers
    /// `[borders[i-1], borders[i])` of the sorted input.
    pub borders: Vec<usize>,
    /// Refinement passes actually executed.
    pub passes: u32,
    /// `false` when the pass budget ran out before the means stabilized.
    pub converged: bool,
}

/// Failures local to a single refinement run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    /// Fewer distinct values than groups; no partition can feed every mean.
    #[error("need at least {required} distinct durations to cluster, got {distinct}")]
    InsufficientData { required: usize, distinct: usize },
    /// A partition pass left a group empty, so its mean is undefined.
    /// Retrying with the same data would repeat the same partition.
    #[error("partition left group {group} empty (borders {borders:?} over {len} values)")]
    DegenerateBorder {
        group: usize,
        borders: Vec<usize>,
        len: usize,
    },
}

/// Refine the seed means against `values` until they stabilize.
///
/// `values` must be sorted ascending and the seeds ordered low-to-high.
/// Convergence is exact integer equality between passes; hitting the pass
/// budget is a soft failure that returns the last means with
/// `converged: false`.
pub fn refine(values: &[u64], config: &ClusterConfig) -> Result<ClusterOutcome, ClusterError> {
    let k = config.seeds.len();
    let distinct = distinct_count(values);
    if distinct < k {
        return Err(ClusterError::InsufficientData {
            required: k,
            distinct,
        });
    }

    let max_passes = config.max_passes.max(1);
    let mut means = config.seeds.clone();
    let mut borders = vec![0usize; k.saturating_sub(1)];
    for pass in 1..=max_passes {
        for i in 0..borders.len() {
            borders[i] = split_index(values, means[i], means[i + 1]);
        }
        let next = group_means(values, &borders)?;
        trace!(pass, means = ?next, borders = ?borders, "cluster pass");
        if next == means {
            return Ok(ClusterOutcome {
                means,
                borders,
                passes: pass,
                converged: true,
            });
        }
        means = next;
    }

    Ok(ClusterOutcome {
        means,
        borders,
        passes: max_passes,
        converged: false,
    })
}

/// First index whose value is strictly closer to `hi` than to `lo`.
/// Returns `values.len()` when every value stays with the lower mean.
fn split_index(values: &[u64], lo: u64, hi: u64) -> usize {
    values
        .iter()
        .position(|&v| v.abs_diff(lo) > v.abs_diff(hi))
        .unwrap_or(values.len())
}

/// Truncating integer mean of each group, or the group that came up empty.
fn group_means(values: &[u64], borders: &[usize]) -> Result<Vec<u64>, ClusterError> {
    let k = borders.len() + 1;
    let mut means = Vec::with_capacity(k);
    for group in 0..k {
        let start = if group == 0 { 0 } else { borders[group - 1] };
        let end = if group == k - 1 {
            values.len()
        } else {
            borders[group]
        };
        if start >= end {
            return Err(ClusterError::DegenerateBorder {
                group,
                borders: borders.to_vec(),
                len: values.len(),
            });
        }
        let sum: u64 = values[start..end].iter().sum();
        means.push(sum / (end - start) as u64);
    }
    Ok(means)
}

fn distinct_count(values: &[u64]) -> usize {
    if values.is_empty() {
        return 0;
    }
    1 + values.windows(2).filter(|pair| pair[0] != pair[1]).count()
}
