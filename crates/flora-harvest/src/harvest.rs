//! Harvest lifecycle: guard, resolve, download, classify, save.

use crate::classify::{classify, is_vector_image};
use crate::config::HarvestConfig;
use crate::fetch::HttpFetcher;
use crate::guard::{has_prior_output, is_completed, HarvestManifest};
use crate::resolver::PageImageResolver;
use crate::types::{
    HarvestError, HarvestOutcome, HarvestResult, HarvestSummary, ImageReference, SkipReason,
};
use crate::writer::RecordWriter;

/// Drives one harvest per call to [`Harvester::run`].
pub struct Harvester {
    fetcher: HttpFetcher,
    resolver: PageImageResolver,
    writer: RecordWriter,
}

impl Harvester {
    pub fn new(config: &HarvestConfig) -> Self {
        let fetcher = HttpFetcher::new(&config.user_agent);
        let resolver = PageImageResolver::new(fetcher.clone(), config);
        let writer = RecordWriter::new(config.output_dir.clone(), config.record.clone());
        Self {
            fetcher,
            resolver,
            writer,
        }
    }

    /// Check whether `term` should be harvested at all.
    ///
    /// The term is used verbatim; only a blank term counts as missing.
    pub fn check(&self, term: Option<&str>) -> HarvestResult<Result<String, SkipReason>> {
        let term = match term {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Ok(Err(SkipReason::MissingInput)),
        };

        if term.contains(['/', '\\']) {
            return Ok(Err(SkipReason::InvalidTerm));
        }

        let dir = self.writer.output_dir();
        if has_prior_output(dir, term)? {
            let completed = is_completed(dir, term);
            return Ok(Err(SkipReason::AlreadyProcessed { completed }));
        }

        Ok(Ok(term.to_string()))
    }

    /// Run the full pipeline for `term`.
    ///
    /// Skips without side effects when the term is missing or output for it
    /// already exists. Filesystem errors abort the run; download failures
    /// only skip the affected image.
    pub async fn run(&self, term: Option<&str>) -> HarvestResult<HarvestOutcome> {
        let term = match self.check(term)? {
            Ok(term) => term,
            Err(reason) => {
                match reason {
                    SkipReason::MissingInput => tracing::info!("No search term given"),
                    SkipReason::InvalidTerm => {
                        tracing::warn!("Search term contains a path separator")
                    }
                    SkipReason::AlreadyProcessed { completed: true } => {
                        tracing::info!("Search term already harvested")
                    }
                    SkipReason::AlreadyProcessed { completed: false } => tracing::warn!(
                        "Found output from an earlier run without a manifest; it may be incomplete"
                    ),
                }
                return Ok(HarvestOutcome::Skipped(reason));
            }
        };

        tracing::info!("Harvesting images for '{term}'");
        std::fs::create_dir_all(self.writer.output_dir())?;

        let images = self.resolver.resolve(&term).await?;
        let mut summary = HarvestSummary {
            term: term.clone(),
            resolved: images.len(),
            ..Default::default()
        };

        let mut counter = 0usize;
        for image in &images {
            if is_vector_image(image.as_str()) {
                tracing::debug!("Skipping vector image {image}");
                summary.vector_skipped += 1;
                continue;
            }

            let bytes = match self.download(image).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!("Skipping {image}: {e}");
                    summary.download_failures += 1;
                    continue;
                }
            };

            counter += 1;
            let part = classify(image.as_str());
            let saved = self.writer.write(&term, counter, image, part, &bytes)?;
            summary.saved.push(saved);
        }

        // Nothing saved leaves no trace, so the term stays eligible.
        if !summary.saved.is_empty() {
            HarvestManifest::new(&term, summary.saved.clone())
                .write_to_dir(self.writer.output_dir())?;
        }

        tracing::info!(
            "Saved {} of {} image(s) for '{term}'",
            summary.saved_count(),
            summary.resolved
        );

        Ok(HarvestOutcome::Completed(summary))
    }

    async fn download(&self, image: &ImageReference) -> HarvestResult<Vec<u8>> {
        let bytes = self.fetcher.get_bytes(image.as_str()).await?;
        if bytes.is_empty() {
            return Err(HarvestError::Download {
                url: image.url.clone(),
                reason: "empty body".to_string(),
            });
        }
        Ok(bytes)
    }
}
