//! Tabular input: CSV-to-tensor loading and mini-batch iteration.
//!
//! Three table shapes flow through the pipeline:
//! - training features: headered CSV, all columns numeric, one row per sample
//! - training labels: headered single-column CSV of integer class ids
//! - inference features: headered CSV carrying an identifier column that is
//!   split out and excluded from the numeric feature space

use crate::error::{PipelineError, Result};
use candle_core::{Device, Tensor};
use rand::seq::SliceRandom;
use std::io::Read;
use std::path::Path;

/// A numeric feature table: column names plus a `[N, F]` f32 tensor.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    pub columns: Vec<String>,
    pub data: Tensor,
}

impl FeatureTable {
    /// Number of samples (rows).
    pub fn n_rows(&self) -> Result<usize> {
        Ok(self.data.dim(0)?)
    }

    /// Number of feature columns.
    pub fn n_features(&self) -> Result<usize> {
        Ok(self.data.dim(1)?)
    }
}

/// Inference-time features with the identifier column carried out of band.
#[derive(Debug, Clone)]
pub struct InferenceTable {
    /// Row identifiers, in file order.
    pub ids: Vec<String>,
    /// `[N, F]` f32 features, identifier column excluded.
    pub features: Tensor,
}

/// Read a headered all-numeric CSV into a [`FeatureTable`].
pub fn read_features<R: Read>(reader: R, device: &Device) -> Result<FeatureTable> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let columns: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect();

    let mut values: Vec<f32> = Vec::new();
    let mut n_rows = 0usize;
    for record in csv_reader.records() {
        let record = record?;
        if record.len() != columns.len() {
            return Err(PipelineError::Data(format!(
                "row {} has {} fields, expected {}",
                n_rows + 1,
                record.len(),
                columns.len()
            )));
        }
        for (field, column) in record.iter().zip(columns.iter()) {
            let v: f32 = field.trim().parse().map_err(|_| {
                PipelineError::Data(format!(
                    "non-numeric value {field:?} in column {column:?} at row {}",
                    n_rows + 1
                ))
            })?;
            values.push(v);
        }
        n_rows += 1;
    }

    let data = Tensor::from_vec(values, (n_rows, columns.len()), device)?;
    Ok(FeatureTable { columns, data })
}

/// Load a feature table from a CSV file.
pub fn load_features(path: &Path, device: &Device) -> Result<FeatureTable> {
    let file = std::fs::File::open(path)
        .map_err(|e| PipelineError::Data(format!("Failed to open {}: {e}", path.display())))?;
    read_features(file, device)
}

/// Read a headered single-column CSV of integer class labels into a `[N]`
/// i64 tensor.
pub fn read_labels<R: Read>(reader: R, device: &Device) -> Result<Tensor> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut labels: Vec<i64> = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let field = record.get(0).unwrap_or("");
        let label: i64 = field.trim().parse().map_err(|_| {
            PipelineError::Data(format!(
                "non-integer label {field:?} at row {}",
                labels.len() + 1
            ))
        })?;
        labels.push(label);
    }
    let n = labels.len();
    Ok(Tensor::from_vec(labels, n, device)?)
}

/// Load a label column from a CSV file.
pub fn load_labels(path: &Path, device: &Device) -> Result<Tensor> {
    let file = std::fs::File::open(path)
        .map_err(|e| PipelineError::Data(format!("Failed to open {}: {e}", path.display())))?;
    read_labels(file, device)
}

/// Read inference features, splitting out the identifier column.
///
/// The identifier column is not part of the numeric feature space; it is
/// carried as strings for the submission artifact. A missing identifier
/// column is a fatal data error.
pub fn read_inference<R: Read>(
    reader: R,
    id_column: &str,
    device: &Device,
) -> Result<InferenceTable> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect();
    let id_index = headers
        .iter()
        .position(|h| h == id_column)
        .ok_or_else(|| {
            PipelineError::Data(format!("identifier column {id_column:?} not found"))
        })?;

    let n_features = headers.len() - 1;
    let mut ids: Vec<String> = Vec::new();
    let mut values: Vec<f32> = Vec::new();
    let mut n_rows = 0usize;
    for record in csv_reader.records() {
        let record = record?;
        if record.len() != headers.len() {
            return Err(PipelineError::Data(format!(
                "row {} has {} fields, expected {}",
                n_rows + 1,
                record.len(),
                headers.len()
            )));
        }
        for (i, field) in record.iter().enumerate() {
            if i == id_index {
                ids.push(field.to_string());
            } else {
                let v: f32 = field.trim().parse().map_err(|_| {
                    PipelineError::Data(format!(
                        "non-numeric value {field:?} in column {:?} at row {}",
                        headers[i],
                        n_rows + 1
                    ))
                })?;
                values.push(v);
            }
        }
        n_rows += 1;
    }

    let features = Tensor::from_vec(values, (n_rows, n_features), device)?;
    Ok(InferenceTable { ids, features })
}

/// Load inference features from a CSV file.
pub fn load_inference(path: &Path, id_column: &str, device: &Device) -> Result<InferenceTable> {
    let file = std::fs::File::open(path)
        .map_err(|e| PipelineError::Data(format!("Failed to open {}: {e}", path.display())))?;
    read_inference(file, id_column, device)
}

/// Mini-batch iterator over pre-loaded feature/label tensors.
///
/// Each epoch visits every sample exactly once: [`BatchIterator::reshuffle`]
/// draws a fresh permutation of the row indices from a ChaCha8 RNG seeded
/// with `seed + epoch`, and [`BatchIterator::next_batch`] walks it in
/// `batch_size` slices (the last slice may be short).
#[derive(Debug)]
pub struct BatchIterator {
    features: Tensor,
    labels: Tensor,
    order: Vec<u32>,
    batch_size: usize,
    cursor: usize,
}

impl BatchIterator {
    /// `batch_size` must be positive; zero would never advance an epoch.
    pub fn new(features: Tensor, labels: Tensor, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(PipelineError::Config(
                "batch_size must be positive".to_string(),
            ));
        }
        let n = features.dim(0)?;
        Ok(Self {
            features,
            labels,
            order: (0..n as u32).collect(),
            batch_size,
            cursor: 0,
        })
    }

    /// Start a new epoch: rewind and reshuffle with a seed derived from the
    /// base seed and the epoch index.
    pub fn reshuffle(&mut self, seed: u64, epoch: usize) {
        let mut rng = crate::device::seeded_rng(seed.wrapping_add(epoch as u64));
        self.order.shuffle(&mut rng);
        self.cursor = 0;
    }

    /// The next mini-batch as `(features, labels)` tensors, or `None` once
    /// the epoch is exhausted.
    pub fn next_batch(&mut self) -> Result<Option<(Tensor, Tensor)>> {
        if self.cursor >= self.order.len() {
            return Ok(None);
        }
        let end = (self.cursor + self.batch_size).min(self.order.len());
        let index = Tensor::new(&self.order[self.cursor..end], self.features.device())?;
        self.cursor = end;

        let batch_features = self.features.index_select(&index, 0)?;
        let batch_labels = self.labels.index_select(&index, 0)?;
        Ok(Some((batch_features, batch_labels)))
    }

    /// Mini-batches per epoch: `ceil(n / batch_size)`.
    pub fn batches_per_epoch(&self) -> usize {
        self.order.len().div_ceil(self.batch_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;

    const X_CSV: &str = "a,b,c\n1,2,3\n4,5,6\n7,8,9\n";

    #[test]
    fn test_read_features_shape() {
        let table = read_features(X_CSV.as_bytes(), &Device::Cpu).unwrap();
        assert_eq!(table.columns, vec!["a", "b", "c"]);
        assert_eq!(table.data.dims(), &[3, 3]);
        let row0: Vec<f32> = table.data.get(0).unwrap().to_vec1().unwrap();
        assert_eq!(row0, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_read_features_rejects_non_numeric() {
        let csv = "a,b\n1,x\n";
        assert!(read_features(csv.as_bytes(), &Device::Cpu).is_err());
    }

    #[test]
    fn test_read_labels() {
        let labels = read_labels("activity\n0\n2\n2\n5\n".as_bytes(), &Device::Cpu).unwrap();
        let v: Vec<i64> = labels.to_vec1().unwrap();
        assert_eq!(v, vec![0, 2, 2, 5]);
    }

    #[test]
    fn test_read_inference_strips_id_column() {
        let csv = "id,f1,f2\nr1,0.5,1.5\nr2,2.5,3.5\n";
        let table = read_inference(csv.as_bytes(), "id", &Device::Cpu).unwrap();
        assert_eq!(table.ids, vec!["r1", "r2"]);
        assert_eq!(table.features.dims(), &[2, 2]);
        let row1: Vec<f32> = table.features.get(1).unwrap().to_vec1().unwrap();
        assert_eq!(row1, vec![2.5, 3.5]);
    }

    #[test]
    fn test_read_inference_id_not_first_column() {
        let csv = "f1,id,f2\n0.5,r1,1.5\n";
        let table = read_inference(csv.as_bytes(), "id", &Device::Cpu).unwrap();
        assert_eq!(table.ids, vec!["r1"]);
        let row0: Vec<f32> = table.features.get(0).unwrap().to_vec1().unwrap();
        assert_eq!(row0, vec![0.5, 1.5]);
    }

    #[test]
    fn test_read_inference_missing_id_is_fatal() {
        let csv = "f1,f2\n0.5,1.5\n";
        assert!(read_inference(csv.as_bytes(), "id", &Device::Cpu).is_err());
    }

    #[test]
    fn test_batch_iterator_count() {
        let device = Device::Cpu;
        let features = Tensor::zeros((10, 4), DType::F32, &device).unwrap();
        let labels = Tensor::zeros(10, DType::I64, &device).unwrap();

        let mut iter = BatchIterator::new(features, labels, 3).unwrap();
        assert_eq!(iter.batches_per_epoch(), 4); // ceil(10/3)
        iter.reshuffle(42, 0);

        let mut count = 0;
        while iter.next_batch().unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 4);
    }

    #[test]
    fn test_batch_iterator_rejects_zero_batch_size() {
        let device = Device::Cpu;
        let features = Tensor::zeros((4, 2), DType::F32, &device).unwrap();
        let labels = Tensor::zeros(4, DType::I64, &device).unwrap();
        let err = BatchIterator::new(features, labels, 0).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_epoch_covers_every_sample_once() {
        let device = Device::Cpu;
        let n = 7usize;
        // Feature row i holds the value i so batch contents are observable.
        let values: Vec<f32> = (0..n).map(|i| i as f32).collect();
        let features = Tensor::from_vec(values, (n, 1), &device).unwrap();
        let labels = Tensor::zeros(n, DType::I64, &device).unwrap();

        let mut iter = BatchIterator::new(features, labels, 2).unwrap();
        iter.reshuffle(42, 3);

        let mut seen: Vec<f32> = Vec::new();
        while let Some((batch, _)) = iter.next_batch().unwrap() {
            seen.extend(batch.flatten_all().unwrap().to_vec1::<f32>().unwrap());
        }
        seen.sort_by(f32::total_cmp);
        let expected: Vec<f32> = (0..n).map(|i| i as f32).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_reshuffle_varies_by_epoch() {
        let device = Device::Cpu;
        let n = 32usize;
        let values: Vec<f32> = (0..n).map(|i| i as f32).collect();
        let features = Tensor::from_vec(values, (n, 1), &device).unwrap();
        let labels = Tensor::zeros(n, DType::I64, &device).unwrap();

        let mut iter = BatchIterator::new(features, labels, n).unwrap();
        iter.reshuffle(42, 0);
        let (first, _) = iter.next_batch().unwrap().unwrap();
        let epoch0: Vec<f32> = first.flatten_all().unwrap().to_vec1().unwrap();

        iter.reshuffle(42, 1);
        let (first, _) = iter.next_batch().unwrap().unwrap();
        let epoch1: Vec<f32> = first.flatten_all().unwrap().to_vec1().unwrap();

        assert_ne!(epoch0, epoch1);
    }
}
