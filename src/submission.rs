//! Submission artifact: a header-less CSV with the prediction column filled.
//!
//! The contest ships a sample submission (row id plus a placeholder
//! prediction column, no header). The pipeline loads it as a template,
//! overwrites the designated column with predicted class ids, and writes it
//! back out comma-separated, without a header row and without an index
//! column.

use crate::error::{PipelineError, Result};
use std::io::{Read, Write};
use std::path::Path;

/// Column index conventionally holding the prediction placeholder.
pub const PREDICTION_COLUMN: usize = 1;

/// Rows of a header-less submission CSV.
#[derive(Debug, Clone)]
pub struct SubmissionTemplate {
    rows: Vec<Vec<String>>,
}

impl SubmissionTemplate {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Overwrite `column` in every row with the given values.
    ///
    /// The value count must match the row count exactly; the template's row
    /// order is the contract with the contest's scorer.
    pub fn fill(&mut self, column: usize, values: &[i64]) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(PipelineError::Data(format!(
                "{} predictions for {} submission rows",
                values.len(),
                self.rows.len()
            )));
        }
        for (row, value) in self.rows.iter_mut().zip(values.iter()) {
            let slot = row.get_mut(column).ok_or_else(|| {
                PipelineError::Data(format!("submission row has no column {column}"))
            })?;
            *slot = value.to_string();
        }
        Ok(())
    }

    /// Serialize as comma-separated text, no header, no index.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Read a header-less submission template.
pub fn read_template<R: Read>(reader: R) -> Result<SubmissionTemplate> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(reader);
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(SubmissionTemplate { rows })
}

/// Load a submission template from a CSV file.
pub fn load_template(path: &Path) -> Result<SubmissionTemplate> {
    let file = std::fs::File::open(path)
        .map_err(|e| PipelineError::Data(format!("Failed to open {}: {e}", path.display())))?;
    read_template(file)
}

/// Fill the prediction column and persist the submission artifact.
///
/// Terminal side effect of the pipeline; produces no value beyond the file
/// and one informational log line.
pub fn create_submission(
    mut template: SubmissionTemplate,
    predictions: &[i64],
    path: &Path,
) -> Result<()> {
    template.fill(PREDICTION_COLUMN, predictions)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    template.write_to(file)?;

    tracing::info!(
        rows = template.n_rows(),
        path = %path.display(),
        "submission written"
    );
    Ok(())
}
