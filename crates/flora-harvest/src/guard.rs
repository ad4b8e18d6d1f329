//! Already-processed detection and the completion manifest.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{HarvestResult, SavedImage};

/// Completion marker written once every image of a run was saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestManifest {
    pub term: String,
    pub completed_at: DateTime<Utc>,
    pub images: Vec<SavedImage>,
}

/// File name of the manifest for `term`.
pub fn manifest_file_name(term: &str) -> String {
    format!("{term}.manifest.json")
}

/// Path of the manifest for `term` inside `dir`.
pub fn manifest_path(dir: &Path, term: &str) -> PathBuf {
    dir.join(manifest_file_name(term))
}

/// True when any entry in `dir` has a name starting with `term`.
///
/// A missing directory counts as no prior run.
pub fn has_prior_output(dir: &Path, term: &str) -> HarvestResult<bool> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    for entry in entries {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with(term) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// True when a manifest from a finished run exists for `term`.
pub fn is_completed(dir: &Path, term: &str) -> bool {
    manifest_path(dir, term).is_file()
}

impl HarvestManifest {
    pub fn new(term: &str, images: Vec<SavedImage>) -> Self {
        Self {
            term: term.to_string(),
            completed_at: Utc::now(),
            images,
        }
    }

    /// Write the manifest as pretty JSON into `dir`.
    pub fn write_to_dir(&self, dir: &Path) -> HarvestResult<PathBuf> {
        let path = manifest_path(dir, &self.term);
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }

    pub fn read_from_dir(dir: &Path, term: &str) -> HarvestResult<Self> {
        let bytes = std::fs::read(manifest_path(dir, term))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
