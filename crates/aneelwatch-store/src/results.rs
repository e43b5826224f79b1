use std::fs;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use aneelwatch_core::RunResult;
use tempfile::NamedTempFile;
use tracing::info;

use crate::StoreError;

/// The run's results file. Each write replaces the previous run's content.
#[derive(Debug, Clone)]
pub struct ResultsFile {
    path: PathBuf,
}

impl ResultsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `result` as pretty JSON, replacing any previous file atomically.
    ///
    /// The JSON is written to a temp file in the same directory and renamed
    /// over the target, so readers never see a half-written file.
    pub fn write(&self, result: &RunResult) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, result)?;
        tmp.write_all(b"\n")?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|source| StoreError::Persist {
            path: self.path.clone(),
            source,
        })?;

        info!(
            path = %self.path.display(),
            total = result.total_documents,
            "wrote results file"
        );
        Ok(())
    }

    /// Read back the last written run.
    pub fn read(&self) -> Result<RunResult, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::NotFound(self.path.clone()));
        }
        let file = fs::File::open(&self.path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
