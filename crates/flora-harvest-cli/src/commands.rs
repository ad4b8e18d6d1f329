//! Subcommand implementations shared by the binary and the HTTP trigger.

use std::path::Path;

use serde_json::{json, Value};

use flora_harvest::{classify, image_extension, is_vector_image, HarvestConfig, Harvester};

/// Run one harvest and return the status line to print.
pub async fn harvest(config: &HarvestConfig, term: Option<&str>) -> anyhow::Result<String> {
    let harvester = Harvester::new(config);
    let outcome = harvester.run(term).await?;
    Ok(outcome.status_line())
}

/// Index the sidecars in `dir` into `output` and return the status line.
pub fn index(dir: &Path, output: &Path) -> anyhow::Result<String> {
    let index = flora_harvest::write_index(dir, output)?;
    Ok(format!("{} observation(s) written to {}", index.len(), output.display()))
}

/// Describe how a URL would be handled by a harvest.
pub fn classify_report(url: &str) -> Value {
    let vector = is_vector_image(url);
    json!({
        "url": url,
        "vector": vector,
        "content": if vector { Value::Null } else { json!(classify(url).as_str()) },
        "extension": image_extension(url),
    })
}
