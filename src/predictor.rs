//! Inference over held-out features with a trained network.

use crate::data::InferenceTable;
use crate::error::Result;
use crate::network::Network;
use candle_core::{DType, Tensor, D};

/// Produce per-class scores for every row of the inference table.
///
/// Switches the network to evaluation mode and detaches the input from any
/// gradient tape, then runs a single forward pass. Returns `[N, C]` raw
/// logits in input row order; callers wanting a class pick apply
/// [`predicted_classes`].
pub fn predict(network: &mut Network, table: &InferenceTable) -> Result<Tensor> {
    network.set_eval();
    let logits = network.forward(&table.features.detach())?;
    Ok(logits.detach())
}

/// Arg-max over the class axis: one predicted class id per row.
pub fn predicted_classes(logits: &Tensor) -> Result<Vec<i64>> {
    let classes = logits.argmax(D::Minus1)?.to_dtype(DType::I64)?;
    Ok(classes.to_vec1()?)
}
