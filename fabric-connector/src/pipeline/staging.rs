//! Staging files for handing large text to a tool invocation.
//!
//! A staging file lives for exactly one invocation: it is created right before
//! the tool starts and removed as soon as the tool exits.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::{Error, Result};

/// Directory in which staging files are created.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `text` to a new uniquely named staging file.
    pub fn stage(&self, text: &str) -> Result<StagedFile> {
        let mut file = tempfile::Builder::new()
            .prefix("fabric-stage-")
            .suffix(".txt")
            .tempfile_in(&self.dir)
            .map_err(|e| Error::staging("creating staging file in", &self.dir, e))?;

        file.write_all(text.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| Error::staging("writing", file.path(), e))?;

        debug!(path = %file.path().display(), bytes = text.len(), "Staged input");
        Ok(StagedFile { file })
    }
}

/// A staged input file.
///
/// Dropping it deletes the file too, which covers cancelled requests; the
/// normal path calls [`StagedFile::remove`] to observe deletion errors.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the file now.
    pub fn remove(self) -> Result<()> {
        let path = self.file.path().to_path_buf();
        self.file
            .close()
            .map_err(|e| Error::staging("removing", &path, e))?;
        debug!(path = %path.display(), "Removed staged input");
        Ok(())
    }
}
