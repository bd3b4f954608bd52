//! The classifier network and its builder.
//!
//! Fixed topology: three linear layers `F → H → H → C` with LeakyReLU between
//! them, producing raw per-class logits (no softmax). The architecture never
//! changes after construction.

use crate::config::Parameters;
use crate::data::FeatureTable;
use crate::error::{PipelineError, Result};
use candle_core::{Device, Tensor, Var};
use candle_nn::{Linear, Module};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;

/// Negative slope of the LeakyReLU activations.
pub const LEAKY_RELU_SLOPE: f64 = 0.01;

/// Feed-forward multi-class classifier.
///
/// Parameters live in [`Var`]s shared with the layer tensors, so an optimizer
/// step over [`Network::trainable_vars`] mutates the network in place. Only
/// the trainer may do so; prediction is read-only.
#[derive(Debug)]
pub struct Network {
    fc1: Linear,
    fc2: Linear,
    fc3: Linear,
    vars: Vec<Var>,
    in_features: usize,
    mid_features: usize,
    n_class: usize,
    training: bool,
}

/// A linear layer with PyTorch-style uniform init, `U(-1/√in, 1/√in)`,
/// drawn from the caller's RNG so initialization is seed-deterministic.
fn seeded_linear(
    rng: &mut ChaCha8Rng,
    in_dim: usize,
    out_dim: usize,
    device: &Device,
) -> Result<(Linear, Var, Var)> {
    let bound = 1.0 / (in_dim as f32).sqrt();
    let weight_data: Vec<f32> = (0..out_dim * in_dim)
        .map(|_| rng.gen_range(-bound..bound))
        .collect();
    let bias_data: Vec<f32> = (0..out_dim).map(|_| rng.gen_range(-bound..bound)).collect();

    let weight = Var::from_tensor(&Tensor::from_vec(weight_data, (out_dim, in_dim), device)?)?;
    let bias = Var::from_tensor(&Tensor::from_vec(bias_data, out_dim, device)?)?;

    // The layer shares the Vars' storage, so optimizer updates are visible.
    let layer = Linear::new(weight.as_tensor().clone(), Some(bias.as_tensor().clone()));
    Ok((layer, weight, bias))
}

impl Network {
    /// Create an untrained network with seed-deterministic random parameters.
    pub fn new(
        in_features: usize,
        mid_features: usize,
        n_class: usize,
        seed: u64,
        device: &Device,
    ) -> Result<Self> {
        let mut rng = crate::device::seeded_rng(seed);
        let (fc1, w1, b1) = seeded_linear(&mut rng, in_features, mid_features, device)?;
        let (fc2, w2, b2) = seeded_linear(&mut rng, mid_features, mid_features, device)?;
        let (fc3, w3, b3) = seeded_linear(&mut rng, mid_features, n_class, device)?;

        Ok(Self {
            fc1,
            fc2,
            fc3,
            vars: vec![w1, b1, w2, b2, w3, b3],
            in_features,
            mid_features,
            n_class,
            training: true,
        })
    }

    /// Forward pass: `[N, F]` features to `[N, C]` raw logits.
    pub fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let width = x.dim(candle_core::D::Minus1)?;
        if width != self.in_features {
            return Err(PipelineError::Model(format!(
                "input has {} features, network expects {}",
                width, self.in_features
            )));
        }

        let h = candle_nn::ops::leaky_relu(&self.fc1.forward(x)?, LEAKY_RELU_SLOPE)?;
        let h = candle_nn::ops::leaky_relu(&self.fc2.forward(&h)?, LEAKY_RELU_SLOPE)?;
        Ok(self.fc3.forward(&h)?)
    }

    /// The parameter variables, for the optimizer.
    pub fn trainable_vars(&self) -> Vec<Var> {
        self.vars.clone()
    }

    /// Enable training-only behaviors (none in this fixed architecture;
    /// reserved for future stochastic layers).
    pub fn set_train(&mut self) {
        self.training = true;
    }

    /// Disable training-only behaviors for inference.
    pub fn set_eval(&mut self) {
        self.training = false;
    }

    pub fn is_training(&self) -> bool {
        self.training
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn mid_features(&self) -> usize {
        self.mid_features
    }

    pub fn n_class(&self) -> usize {
        self.n_class
    }
}

/// Build an untrained network sized from the training data.
///
/// The input width is the feature column count and the output width is the
/// number of **distinct** label values (not `max + 1`). An empty label vector
/// leaves the class count undefined and is a fatal data error.
pub fn build_model(
    features: &FeatureTable,
    labels: &Tensor,
    params: &Parameters,
    device: &Device,
) -> Result<Network> {
    let in_features = features.n_features()?;
    let labels_vec: Vec<i64> = labels.to_vec1()?;
    if labels_vec.is_empty() {
        return Err(PipelineError::Data(
            "label vector is empty, class count is undefined".to_string(),
        ));
    }
    let n_class = labels_vec.iter().collect::<BTreeSet<_>>().len();

    let mut network = Network::new(in_features, params.nn_mid_features, n_class, params.seed, device)?;
    network.set_train();
    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;

    fn params(mid: usize) -> Parameters {
        Parameters {
            nn_mid_features: mid,
            n_epochs: 1,
            learning_rate: 0.01,
            batch_size: 2,
            seed: 42,
        }
    }

    fn feature_table(n: usize, f: usize) -> FeatureTable {
        let values: Vec<f32> = (0..n * f).map(|i| i as f32 * 0.1).collect();
        FeatureTable {
            columns: (0..f).map(|i| format!("f{i}")).collect(),
            data: Tensor::from_vec(values, (n, f), &Device::Cpu).unwrap(),
        }
    }

    #[test]
    fn test_build_model_sizes_from_data() {
        let features = feature_table(6, 4);
        let labels = Tensor::new(&[0i64, 1, 2, 0, 1, 2], &Device::Cpu).unwrap();
        let network = build_model(&features, &labels, &params(8), &Device::Cpu).unwrap();

        assert_eq!(network.in_features(), 4);
        assert_eq!(network.mid_features(), 8);
        assert_eq!(network.n_class(), 3);
        assert!(network.is_training());

        let logits = network.forward(&features.data).unwrap();
        assert_eq!(logits.dims(), &[6, 3]);
    }

    #[test]
    fn test_class_count_is_distinct_values_not_max() {
        let features = feature_table(4, 2);
        // Distinct values {0, 2, 5} -> 3 classes, even though max is 5.
        let labels = Tensor::new(&[0i64, 2, 2, 5], &Device::Cpu).unwrap();
        let network = build_model(&features, &labels, &params(8), &Device::Cpu).unwrap();
        assert_eq!(network.n_class(), 3);
    }

    #[test]
    fn test_empty_labels_rejected() {
        let features = feature_table(0, 2);
        let labels = Tensor::zeros(0, DType::I64, &Device::Cpu).unwrap();
        let err = build_model(&features, &labels, &params(8), &Device::Cpu).unwrap_err();
        assert!(matches!(err, PipelineError::Data(_)));
    }

    #[test]
    fn test_forward_rejects_wrong_width() {
        let network = Network::new(4, 8, 3, 42, &Device::Cpu).unwrap();
        let bad = Tensor::zeros((2, 5), DType::F32, &Device::Cpu).unwrap();
        assert!(matches!(
            network.forward(&bad),
            Err(PipelineError::Model(_))
        ));
    }

    #[test]
    fn test_init_is_seed_deterministic() {
        let a = Network::new(4, 8, 3, 7, &Device::Cpu).unwrap();
        let b = Network::new(4, 8, 3, 7, &Device::Cpu).unwrap();
        for (va, vb) in a.trainable_vars().iter().zip(b.trainable_vars().iter()) {
            let da: Vec<f32> = va.flatten_all().unwrap().to_vec1().unwrap();
            let db: Vec<f32> = vb.flatten_all().unwrap().to_vec1().unwrap();
            assert_eq!(da, db);
        }
    }

    #[test]
    fn test_leaky_relu_negative_inputs_pass_scaled() {
        // One layer of all-negative input must not zero out entirely.
        let network = Network::new(2, 4, 2, 42, &Device::Cpu).unwrap();
        let x = Tensor::new(&[[-1.0f32, -2.0], [-3.0, -4.0]], &Device::Cpu).unwrap();
        let logits = network.forward(&x).unwrap();
        assert_eq!(logits.dims(), &[2, 2]);
    }
}
