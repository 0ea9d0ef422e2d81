//! Smart payroll integration: row formatting and batch file output.

use std::fs;
use std::path::{Path, PathBuf};

use crate::recruitment::domain::{Applicant, Campaign};

#[derive(Debug, thiserror::Error)]
pub enum SmartExportError {
    #[error("failed to write batch file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode batch rows: {0}")]
    Csv(#[from] csv::Error),
}

/// One line of the Smart intake file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartRow {
    pub document_number: String,
    pub full_name: String,
    pub campaign: String,
}

/// Transforms verified applicants into rows the Smart system accepts.
#[derive(Debug, Default)]
pub struct SmartFormatter;

impl SmartFormatter {
    pub fn build_rows<'a, I>(&self, applicants: I) -> Vec<SmartRow>
    where
        I: IntoIterator<Item = (&'a Applicant, &'a Campaign)>,
    {
        applicants
            .into_iter()
            .map(|(applicant, campaign)| SmartRow {
                document_number: applicant.document_number.clone(),
                full_name: applicant.full_name(),
                campaign: campaign.name.clone(),
            })
            .collect()
    }
}

/// Writes batch files into the configured export directory.
pub struct SmartBatchWriter {
    output_dir: PathBuf,
}

impl SmartBatchWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write `<batch_code>.csv` and return its path.
    pub fn save_batch(&self, batch_code: &str, rows: &[SmartRow]) -> Result<String, SmartExportError> {
        fs::create_dir_all(&self.output_dir)?;
        let file_path = self.output_dir.join(format!("{batch_code}.csv"));
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&file_path)?;
        for row in rows {
            writer.write_record([&row.document_number, &row.full_name, &row.campaign])?;
        }
        writer.flush()?;
        Ok(file_path.to_string_lossy().into_owned())
    }
}

/// Resolve a previously written batch file, if it still exists.
pub fn batch_file(path: &str) -> Option<PathBuf> {
    if path.is_empty() {
        return None;
    }
    let path = Path::new(path);
    path.exists().then(|| path.to_path_buf())
}
