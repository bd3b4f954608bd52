//! Pipeline hyperparameters, loaded from a YAML parameters file.

use crate::error::{PipelineError, Result};
use serde::Deserialize;
use std::path::Path;

fn default_seed() -> u64 {
    42
}

/// Hyperparameters for model construction and training.
///
/// Every field except `seed` is required; a missing key is a fatal parse
/// error, never silently defaulted.
#[derive(Debug, Clone, Deserialize)]
pub struct Parameters {
    /// Hidden-layer width of the classifier.
    pub nn_mid_features: usize,
    /// Number of full passes over the training set.
    pub n_epochs: usize,
    /// Adam learning rate.
    pub learning_rate: f64,
    /// Mini-batch size (last batch of an epoch may be shorter).
    pub batch_size: usize,
    /// Seed for parameter initialization and epoch shuffles.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Parameters {
    /// Parse parameters from a YAML document.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let params: Parameters = serde_yaml::from_str(s)
            .map_err(|e| PipelineError::Config(format!("Failed to parse parameters: {e}")))?;
        params.validate()?;
        Ok(params)
    }

    /// Load parameters from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Reject zero-valued hyperparameters before any of them drive a loop.
    pub fn validate(&self) -> Result<()> {
        if self.nn_mid_features == 0 {
            return Err(PipelineError::Config(
                "nn_mid_features must be positive".to_string(),
            ));
        }
        if self.n_epochs == 0 {
            return Err(PipelineError::Config("n_epochs must be positive".to_string()));
        }
        if self.learning_rate <= 0.0 {
            return Err(PipelineError::Config(
                "learning_rate must be positive".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(PipelineError::Config(
                "batch_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
