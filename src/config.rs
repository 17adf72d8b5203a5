use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::adjuster::SizeRequest;
use crate::penalty::PenaltyKind;
use crate::scoring::{MixingMultiplier, ScoringParams};
use crate::Result;

pub const DEFAULT_MIN_SIZE: usize = 3;
pub const DEFAULT_N_DRAWS: usize = 1_000;

/// Parameters of one matching run. Every field has a default, so a JSON
/// config file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub min_size: Option<usize>,
    pub n_groups: Option<usize>,
    pub max_size: Option<usize>,
    /// Number of random candidates to score.
    pub n_draws: usize,
    /// First seed of the per-draw seed sequence.
    pub seed: u64,
    pub assortative: bool,
    pub mixing_multiplier: MixingMultiplier,
    pub penalty: PenaltyKind,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_size: Some(DEFAULT_MIN_SIZE),
            n_groups: None,
            max_size: None,
            n_draws: DEFAULT_N_DRAWS,
            seed: 0,
            assortative: false,
            mixing_multiplier: MixingMultiplier::default(),
            penalty: PenaltyKind::default(),
        }
    }
}

impl MatchingConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn size_request(&self) -> SizeRequest {
        SizeRequest {
            min_size: self.min_size,
            n_groups: self.n_groups,
            max_size: self.max_size,
        }
    }

    pub fn scoring_params(&self) -> ScoringParams {
        ScoringParams {
            penalty: self.penalty.into(),
            mixing: self.mixing_multiplier.clone(),
            assortative: self.assortative,
        }
    }
}
