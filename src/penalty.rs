use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{RegroupError, Result};

/// Counts probed by `Penalty::validate`.
const PROBE_LIMIT: u32 = 16;

/// Built-in penalty shapes, selectable by name from config or the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyKind {
    #[default]
    Exponential,
    Linear,
    Squared,
    /// `-exp(v)`: rewards repeated pairings instead of punishing them.
    NegativeExponential,
}

/// Maps how often a pair has met to the cost of that pair.
#[derive(Clone)]
pub enum Penalty {
    Builtin(PenaltyKind),
    Custom {
        name: String,
        func: Arc<dyn Fn(u32) -> f64 + Send + Sync>,
    },
}

impl Penalty {
    pub fn custom<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(u32) -> f64 + Send + Sync + 'static,
    {
        Penalty::Custom {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn apply(&self, count: u32) -> f64 {
        let x = count as f64;
        match self {
            Penalty::Builtin(PenaltyKind::Exponential) => x.exp(),
            Penalty::Builtin(PenaltyKind::Linear) => x,
            Penalty::Builtin(PenaltyKind::Squared) => x * x,
            Penalty::Builtin(PenaltyKind::NegativeExponential) => -x.exp(),
            Penalty::Custom { func, .. } => func(count),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Penalty::Builtin(PenaltyKind::Exponential) => "exponential",
            Penalty::Builtin(PenaltyKind::Linear) => "linear",
            Penalty::Builtin(PenaltyKind::Squared) => "squared",
            Penalty::Builtin(PenaltyKind::NegativeExponential) => "negative_exponential",
            Penalty::Custom { name, .. } => name,
        }
    }

    /// Probe the function on small counts; every value must be finite.
    pub fn validate(&self) -> Result<()> {
        for count in 0..=PROBE_LIMIT {
            let value = self.apply(count);
            if !value.is_finite() {
                return Err(RegroupError::InvalidPenalty(format!(
                    "penalty '{}' returned {} for count {}",
                    self.name(),
                    value,
                    count
                )));
            }
        }
        Ok(())
    }
}

impl Default for Penalty {
    fn default() -> Self {
        Penalty::Builtin(PenaltyKind::Exponential)
    }
}

impl From<PenaltyKind> for Penalty {
    fn from(kind: PenaltyKind) -> Self {
        Penalty::Builtin(kind)
    }
}

impl fmt::Debug for Penalty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Penalty({})", self.name())
    }
}
