//! Resolve a search term into direct image file URLs via the MediaWiki API.
//!
//! Two request kinds are involved: one `prop=images` query listing the image
//! titles attached to the page, then one `prop=imageinfo` query per title to
//! obtain its file URL. Responses missing the expected keys contribute
//! nothing instead of failing the run.

use std::collections::BTreeMap;

use futures::stream::{self, StreamExt};
use serde::Deserialize;

use crate::config::HarvestConfig;
use crate::fetch::HttpFetcher;
use crate::types::{HarvestResult, ImageReference};

#[derive(Debug, Default, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    query: Option<ApiQuery>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiQuery {
    #[serde(default)]
    pages: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiPage {
    #[serde(default)]
    images: Vec<ApiImage>,
    #[serde(default)]
    imageinfo: Vec<ApiImageInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiImage {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiImageInfo {
    #[serde(default)]
    url: Option<String>,
}

fn parse_pages(body: &str) -> Vec<ApiPage> {
    let pages = match serde_json::from_str::<ApiResponse>(body) {
        Ok(resp) => resp.query.map(|q| q.pages).unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Ignoring malformed API response: {e}");
            return Vec::new();
        }
    };

    // Each page is decoded on its own so one bad entry only drops itself.
    pages
        .into_iter()
        .filter_map(|(id, value)| match serde_json::from_value::<ApiPage>(value) {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::warn!("Ignoring malformed page {id}: {e}");
                None
            }
        })
        .collect()
}

/// Every image title listed under `query.pages.*.images`.
pub fn parse_image_titles(body: &str) -> Vec<String> {
    parse_pages(body)
        .into_iter()
        .flat_map(|page| page.images)
        .filter_map(|image| image.title)
        .collect()
}

/// Direct file URLs from an `imageinfo` response, one per page that has one.
pub fn parse_image_urls(body: &str) -> Vec<String> {
    parse_pages(body)
        .into_iter()
        .filter_map(|page| page.imageinfo.into_iter().next())
        .filter_map(|info| info.url)
        .collect()
}

/// MediaWiki client that turns a search term into image references.
pub struct PageImageResolver {
    fetcher: HttpFetcher,
    api_url: String,
    image_limit: u32,
    concurrency: usize,
}

impl PageImageResolver {
    pub fn new(fetcher: HttpFetcher, config: &HarvestConfig) -> Self {
        Self {
            fetcher,
            api_url: config.api_url.clone(),
            image_limit: config.image_limit,
            concurrency: config.concurrency.max(1),
        }
    }

    /// Query URL listing the images attached to the page titled `term`.
    pub fn page_images_url(&self, term: &str) -> HarvestResult<String> {
        let titles = term.replace(' ', "_");
        let limit = self.image_limit.to_string();
        let url = url::Url::parse_with_params(
            &self.api_url,
            &[
                ("action", "query"),
                ("titles", titles.as_str()),
                ("prop", "images"),
                ("format", "json"),
                ("imlimit", limit.as_str()),
            ],
        )?;
        Ok(url.into())
    }

    /// Query URL resolving the file URL of the image titled `title`.
    pub fn image_info_url(&self, title: &str) -> HarvestResult<String> {
        let titles = title.replace(' ', "_");
        let url = url::Url::parse_with_params(
            &self.api_url,
            &[
                ("action", "query"),
                ("titles", titles.as_str()),
                ("prop", "imageinfo"),
                ("iiprop", "url"),
                ("format", "json"),
            ],
        )?;
        Ok(url.into())
    }

    /// Image titles attached to the page for `term`. Transport failures and
    /// malformed responses yield an empty list.
    pub async fn image_titles(&self, term: &str) -> HarvestResult<Vec<String>> {
        let url = self.page_images_url(term)?;
        let body = match self.fetcher.get_text(&url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Page lookup for '{term}' failed: {e}");
                return Ok(Vec::new());
            }
        };
        Ok(parse_image_titles(&body))
    }

    /// File URLs for a single image title. Failures yield an empty list.
    pub async fn image_urls(&self, title: &str) -> Vec<String> {
        let url = match self.image_info_url(title) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot build image info URL for '{title}': {e}");
                return Vec::new();
            }
        };

        match self.fetcher.get_text(&url).await {
            Ok(body) => parse_image_urls(&body),
            Err(e) => {
                tracing::warn!("Image info lookup for '{title}' failed: {e}");
                Vec::new()
            }
        }
    }

    /// Resolve `term` into image references, in title order. Per-title
    /// lookups run concurrently up to the configured cap.
    pub async fn resolve(&self, term: &str) -> HarvestResult<Vec<ImageReference>> {
        let titles = self.image_titles(term).await?;
        tracing::info!("Page '{term}' lists {} image title(s)", titles.len());

        let resolved: Vec<Vec<String>> = stream::iter(titles)
            .map(|title| async move { self.image_urls(&title).await })
            .buffered(self.concurrency)
            .collect()
            .await;

        Ok(resolved
            .into_iter()
            .flatten()
            .map(ImageReference::new)
            .collect())
    }
}
