use super::defaults::{
    MAX_CLUSTER_PASS_LIMIT, MAX_GAP_SEED_RATIO, MAX_WORD_GAP_RATIO, MIN_GAP_SEED_RATIO,
    MIN_WORD_GAP_RATIO,
};
use super::AppConfig;
use crate::decode::DecodeOptions;
use anyhow::{bail, Result};
use clap::Parser;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values before they reach the decode pipeline.
    pub fn validate(&mut self) -> Result<()> {
        if !(MIN_GAP_SEED_RATIO..=MAX_GAP_SEED_RATIO).contains(&self.gap_seed_ratio) {
            bail!(
                "--gap-seed-ratio must be between {MIN_GAP_SEED_RATIO} and {MAX_GAP_SEED_RATIO}, got {}",
                self.gap_seed_ratio
            );
        }
        if !(MIN_WORD_GAP_RATIO..=MAX_WORD_GAP_RATIO).contains(&self.word_gap_ratio) {
            bail!(
                "--word-gap-ratio must be between {MIN_WORD_GAP_RATIO} and {MAX_WORD_GAP_RATIO}, got {}",
                self.word_gap_ratio
            );
        }
        if self.cluster_max_passes == 0 || self.cluster_max_passes > MAX_CLUSTER_PASS_LIMIT {
            bail!(
                "--cluster-max-passes must be between 1 and {MAX_CLUSTER_PASS_LIMIT}, got {}",
                self.cluster_max_passes
            );
        }
        Ok(())
    }

    /// Snapshot the CLI-controlled decode settings for downstream consumers.
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            gap_seed_ratio: self.gap_seed_ratio,
            word_gap_ratio: self.word_gap_ratio,
            max_passes: self.cluster_max_passes,
            ratio_fallback: !self.no_ratio_fallback,
        }
    }
}
