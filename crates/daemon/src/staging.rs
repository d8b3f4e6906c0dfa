//! Temporary on-disk staging of uploaded recordings.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tempfile::TempDir;
use tracing::debug;

/// An uploaded file as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { filename: filename.into(), bytes }
    }

    pub fn has_extension(&self, ext: &str) -> bool {
        self.filename.ends_with(ext)
    }
}

/// Reduce a client-supplied name to a safe file name: the last path
/// component, spaces turned into underscores, only ASCII letters, digits,
/// `.`, `_` and `-` kept, and no leading dots or underscores.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let trimmed = cleaned.trim_start_matches(['.', '_']);
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// A data/header pair written to a private temporary directory.
///
/// The directory and both files are removed when the value is dropped or
/// closed; removal errors are ignored.
#[derive(Debug)]
pub struct StagedRecording {
    dir: TempDir,
    eeg_path: PathBuf,
    vhdr_path: PathBuf,
}

impl StagedRecording {
    /// Write both files under a fresh directory inside `parent`, or inside
    /// the system temp directory when `parent` is `None`.
    pub fn stage(
        parent: Option<&Path>,
        eeg_name: &str,
        eeg_bytes: &[u8],
        vhdr_name: &str,
        vhdr_bytes: &[u8],
    ) -> anyhow::Result<Self> {
        let dir = match parent {
            Some(parent) => tempfile::Builder::new()
                .prefix("eeg-upload-")
                .tempdir_in(parent)
                .with_context(|| format!("Could not create staging dir in '{}'", parent.display()))?,
            None => tempfile::Builder::new()
                .prefix("eeg-upload-")
                .tempdir()
                .context("Could not create staging dir")?,
        };

        let eeg_path = dir.path().join(eeg_name);
        // Two uploads with the same sanitized name must not overwrite each other.
        let vhdr_path = if vhdr_name == eeg_name {
            dir.path().join(format!("header-{}", vhdr_name))
        } else {
            dir.path().join(vhdr_name)
        };
        fs::write(&eeg_path, eeg_bytes)
            .with_context(|| format!("Could not stage '{}'", eeg_path.display()))?;
        fs::write(&vhdr_path, vhdr_bytes)
            .with_context(|| format!("Could not stage '{}'", vhdr_path.display()))?;

        debug!("Staged upload in {}", dir.path().display());
        Ok(Self { dir, eeg_path, vhdr_path })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn eeg_path(&self) -> &Path {
        &self.eeg_path
    }

    pub fn vhdr_path(&self) -> &Path {
        &self.vhdr_path
    }

    pub fn open_eeg(&self) -> std::io::Result<File> {
        File::open(&self.eeg_path)
    }

    /// Header contents, with invalid UTF-8 replaced.
    pub fn read_header(&self) -> std::io::Result<String> {
        let bytes = fs::read(&self.vhdr_path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Remove the staged files now.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            debug!("Ignoring cleanup failure for {}: {}", path.display(), e);
        }
    }
}
