//! Core data types for harvested images and their metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse plant-anatomy category assigned to an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlantPart {
    Flower,
    Stem,
    Leaf,
    Fruit,
    Branch,
    LeafScan,
    #[default]
    Entire,
}

impl PlantPart {
    /// Label as written into the `Content` element.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlantPart::Flower => "Flower",
            PlantPart::Stem => "Stem",
            PlantPart::Leaf => "Leaf",
            PlantPart::Fruit => "Fruit",
            PlantPart::Branch => "Branch",
            PlantPart::LeafScan => "LeafScan",
            PlantPart::Entire => "Entire",
        }
    }
}

impl fmt::Display for PlantPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved absolute URL to a single image file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    pub url: String,
}

impl ImageReference {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// One image written to disk together with its sidecar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedImage {
    pub media_id: String,
    pub file_name: String,
    pub metadata_file: String,
    pub source_url: String,
    pub plant_part: PlantPart,
}

/// Counts and entries produced by one completed harvest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarvestSummary {
    pub term: String,
    pub resolved: usize,
    pub vector_skipped: usize,
    pub download_failures: usize,
    pub saved: Vec<SavedImage>,
}

impl HarvestSummary {
    pub fn saved_count(&self) -> usize {
        self.saved.len()
    }
}

/// Why a harvest finished without doing any work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No search term, or only whitespace.
    MissingInput,
    /// The term contains a path separator and cannot be used as a file
    /// name prefix inside the output directory.
    InvalidTerm,
    /// Output files for the term already exist. `completed` is true when a
    /// manifest from a finished run was found.
    AlreadyProcessed { completed: bool },
}

/// Final state of a harvest invocation.
#[derive(Debug, Clone)]
pub enum HarvestOutcome {
    Skipped(SkipReason),
    Completed(HarvestSummary),
}

/// Status line printed for every skipped invocation.
pub const SKIP_STATUS: &str = "empty search or search already done";

impl HarvestOutcome {
    /// One-line, user-facing description of the outcome.
    pub fn status_line(&self) -> String {
        match self {
            HarvestOutcome::Skipped(_) => SKIP_STATUS.to_string(),
            HarvestOutcome::Completed(summary) => format!(
                "harvested {} image(s) for '{}' ({} resolved, {} vector skipped, {} download failures)",
                summary.saved_count(),
                summary.term,
                summary.resolved,
                summary.vector_skipped,
                summary.download_failures
            ),
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, HarvestOutcome::Skipped(_))
    }
}

/// Errors that can occur while harvesting.
#[derive(thiserror::Error, Debug)]
pub enum HarvestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Download failed for {url}: {reason}")]
    Download { url: String, reason: String },
}

/// Convenience result type.
pub type HarvestResult<T> = Result<T, HarvestError>;
