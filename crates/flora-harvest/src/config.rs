//! Harvest configuration and resolution.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// MediaWiki API endpoint used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Browser user-agent sent with every request.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows; U; Windows NT 6.1; en-US; rv:1.9.1.2) Gecko/20090729 Firefox/3.5.2 GTB5";

/// Maximum number of image titles requested per page.
pub const DEFAULT_IMAGE_LIMIT: u32 = 500;

/// Concurrent image-info lookups during resolution.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Settings for one harvest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    pub api_url: String,
    pub user_agent: String,
    pub output_dir: PathBuf,
    pub image_limit: u32,
    pub concurrency: usize,
    pub record: RecordDefaults,
}

/// Fixed values written into every metadata record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDefaults {
    pub author: String,
    pub year_in_clef: String,
    pub learn_tag: String,
}

impl Default for RecordDefaults {
    fn default() -> Self {
        Self {
            author: "B6".to_string(),
            year_in_clef: "PlantCLEF2015".to_string(),
            learn_tag: "Train".to_string(),
        }
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            output_dir: PathBuf::from("."),
            image_limit: DEFAULT_IMAGE_LIMIT,
            concurrency: DEFAULT_CONCURRENCY,
            record: RecordDefaults::default(),
        }
    }
}

impl HarvestConfig {
    /// Build a config from explicit values, falling back to environment
    /// variables and then to defaults.
    pub fn resolve(api_url: Option<&str>, output_dir: Option<&str>) -> Self {
        Self {
            api_url: resolve_api_url(api_url),
            output_dir: resolve_output_dir(output_dir),
            ..Self::default()
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_image_limit(mut self, limit: u32) -> Self {
        self.image_limit = limit;
        self
    }
}

/// Resolve the API endpoint: explicit > `FLORA_API_URL` > default.
pub fn resolve_api_url(explicit: Option<&str>) -> String {
    if let Some(url) = explicit {
        return url.to_string();
    }

    if let Ok(env_url) = std::env::var("FLORA_API_URL") {
        if !env_url.is_empty() {
            return env_url;
        }
    }

    DEFAULT_API_URL.to_string()
}

/// Resolve the output directory: explicit > `FLORA_OUTPUT_DIR` > cwd.
pub fn resolve_output_dir(explicit: Option<&str>) -> PathBuf {
    if let Some(dir) = explicit {
        return PathBuf::from(dir);
    }

    if let Ok(env_dir) = std::env::var("FLORA_OUTPUT_DIR") {
        if !env_dir.is_empty() {
            return PathBuf::from(env_dir);
        }
    }

    PathBuf::from(".")
}
