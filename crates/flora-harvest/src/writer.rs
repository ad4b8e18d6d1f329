//! Persist downloaded images and their metadata sidecars.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::classify::{image_extension, FALLBACK_EXTENSION};
use crate::config::RecordDefaults;
use crate::record::{media_id, MetadataRecord};
use crate::types::{HarvestResult, ImageReference, PlantPart, SavedImage};

/// Writes `{term}{n}.{ext}` and `{term}{n}.xml` into one directory.
pub struct RecordWriter {
    output_dir: PathBuf,
    defaults: RecordDefaults,
}

impl RecordWriter {
    pub fn new(output_dir: impl Into<PathBuf>, defaults: RecordDefaults) -> Self {
        Self {
            output_dir: output_dir.into(),
            defaults,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the image bytes, then the sidecar, dated today.
    ///
    /// The two writes are not atomic: a failure after the first leaves the
    /// image without its sidecar.
    pub fn write(
        &self,
        term: &str,
        counter: usize,
        image: &ImageReference,
        part: PlantPart,
        bytes: &[u8],
    ) -> HarvestResult<SavedImage> {
        self.write_dated(term, counter, image, part, bytes, Local::now().date_naive())
    }

    pub fn write_dated(
        &self,
        term: &str,
        counter: usize,
        image: &ImageReference,
        part: PlantPart,
        bytes: &[u8],
        date: NaiveDate,
    ) -> HarvestResult<SavedImage> {
        let stem = media_id(term, counter);
        let ext = image_extension(image.as_str()).unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
        let file_name = format!("{stem}.{ext}");
        let metadata_file = format!("{stem}.xml");

        std::fs::write(self.output_dir.join(&file_name), bytes)?;

        let record = MetadataRecord::new(
            term,
            counter,
            &file_name,
            part,
            &self.defaults,
            date,
            &mut rand::thread_rng(),
        );
        std::fs::write(self.output_dir.join(&metadata_file), record.to_xml())?;

        tracing::debug!("Saved {file_name} ({part}) from {image}");

        Ok(SavedImage {
            media_id: stem,
            file_name,
            metadata_file,
            source_url: image.url.clone(),
            plant_part: part,
        })
    }
}
