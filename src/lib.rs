//! HAR classifier training pipeline.
//!
//! Implements the data-science leg of the HAR tabular contest: load feature
//! and label tables, build a small feed-forward classifier sized from the
//! data, train it with mini-batch Adam, run inference over the held-out
//! features, and write the submission CSV.
//!
//! The pipeline is strictly linear and single-threaded:
//!
//! ```text
//! x_train.csv ─┐
//! y_train.csv ─┼─▶ build_model ─▶ train ─▶ predict ─▶ create_submission
//! x_test.csv ──┘
//! ```
//!
//! # Modules
//!
//! - [`config`] — hyperparameters loaded from YAML
//! - [`data`] — CSV-to-tensor loading and mini-batch iteration
//! - [`network`] — the three-layer classifier and its builder
//! - [`trainer`] — the epoch/mini-batch training loop
//! - [`predictor`] — inference-mode forward pass
//! - [`submission`] — submission artifact writing

pub mod config;
pub mod data;
pub mod device;
pub mod error;
pub mod network;
pub mod predictor;
pub mod submission;
pub mod trainer;

/// Re-export of the types an embedding caller needs to run the pipeline.
pub mod prelude {
    pub use crate::config::Parameters;
    pub use crate::data::{BatchIterator, FeatureTable, InferenceTable};
    pub use crate::device::select_device;
    pub use crate::error::{PipelineError, Result};
    pub use crate::network::{build_model, Network};
    pub use crate::predictor::{predict, predicted_classes};
    pub use crate::submission::{create_submission, SubmissionTemplate};
    pub use crate::trainer::{train, EpochMetrics};
}
