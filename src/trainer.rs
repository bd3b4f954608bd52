//! Mini-batch gradient-descent training loop.

use crate::config::Parameters;
use crate::data::{BatchIterator, FeatureTable};
use crate::error::{PipelineError, Result};
use crate::network::Network;
use candle_core::Tensor;
use candle_nn::Optimizer;

/// Per-epoch metrics recorded during training.
///
/// Purely observational: training always runs for the configured epoch count
/// regardless of the loss trend.
#[derive(Debug, Clone)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub train_loss: f64,
    pub steps: usize,
}

/// Train the network in place over the full training set.
///
/// Runs exactly `n_epochs` epochs of `ceil(N / batch_size)` optimizer steps
/// each: per mini-batch, forward pass, multi-class cross-entropy on the raw
/// logits, backpropagation, one Adam update of the network's parameters.
/// Every epoch visits each sample exactly once in a freshly shuffled order.
///
/// No early stopping and no validation split; a single failure aborts
/// training. Preconditions (positive batch size, matching feature/label row
/// counts) are checked before the optimizer exists, so a failed call leaves
/// the parameters untouched.
pub fn train(
    features: &FeatureTable,
    labels: &Tensor,
    network: &Network,
    params: &Parameters,
) -> Result<Vec<EpochMetrics>> {
    params.validate()?;
    let n_samples = features.n_rows()?;
    let n_labels = labels.dim(0)?;
    if n_samples != n_labels {
        return Err(PipelineError::Data(format!(
            "{n_samples} feature rows but {n_labels} labels"
        )));
    }

    let mut optimizer = candle_nn::AdamW::new(
        network.trainable_vars(),
        candle_nn::ParamsAdamW {
            lr: params.learning_rate,
            weight_decay: 0.0,
            ..Default::default()
        },
    )?;

    let mut batches = BatchIterator::new(features.data.clone(), labels.clone(), params.batch_size)?;

    println!(
        "Training: {} samples, lr={}, batch={}, epochs={}",
        n_samples, params.learning_rate, params.batch_size, params.n_epochs,
    );

    let mut history: Vec<EpochMetrics> = Vec::with_capacity(params.n_epochs);
    for epoch in 0..params.n_epochs {
        batches.reshuffle(params.seed, epoch);

        let mut epoch_loss = 0.0f64;
        let mut steps = 0usize;
        while let Some((batch_features, batch_labels)) = batches.next_batch()? {
            let logits = network.forward(&batch_features)?;
            let loss = candle_nn::loss::cross_entropy(&logits, &batch_labels)?;
            optimizer.backward_step(&loss)?;

            epoch_loss += f64::from(loss.to_scalar::<f32>()?);
            steps += 1;
        }

        let train_loss = if steps > 0 {
            epoch_loss / steps as f64
        } else {
            0.0
        };
        println!("  epoch {:3} | train_loss={:.4}", epoch + 1, train_loss);

        history.push(EpochMetrics {
            epoch: epoch + 1,
            train_loss,
            steps,
        });
    }

    Ok(history)
}
