//! Keyword classification of image URLs into plant parts.

use std::path::Path;

use crate::types::PlantPart;

const FLOWER_KEYWORDS: &[&str] = &[
    "flower",
    "flowers",
    "flora",
    "floret",
    "inflorescence",
    "bloom",
    "blossom",
];
const STEM_KEYWORDS: &[&str] = &["bark", "wood", "trunk"];
const LEAF_KEYWORDS: &[&str] = &["leaf", "leaves", "folie", "foliage"];
const FRUIT_KEYWORDS: &[&str] = &["fruit", "fruits", "seed", "seeds", "fructus"];
const BRANCH_KEYWORDS: &[&str] = &["branch", "branches"];

/// Extension used when an image URL has none.
pub const FALLBACK_EXTENSION: &str = "bin";

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

/// Classify an image URL. Rules are checked in priority order and the first
/// match wins; anything unmatched is `Entire`.
///
/// The `LeafScan` rule can never fire: every URL it would match already
/// contains "leaf" or "leaves" and is taken by the `Leaf` rule first. It is
/// kept in place so the rule order stays intact.
pub fn classify(url: &str) -> PlantPart {
    let url = url.to_lowercase();

    if contains_any(&url, FLOWER_KEYWORDS) {
        PlantPart::Flower
    } else if contains_any(&url, STEM_KEYWORDS) {
        PlantPart::Stem
    } else if contains_any(&url, LEAF_KEYWORDS) {
        PlantPart::Leaf
    } else if contains_any(&url, FRUIT_KEYWORDS) {
        PlantPart::Fruit
    } else if contains_any(&url, BRANCH_KEYWORDS) {
        PlantPart::Branch
    } else if (url.contains("scan") && url.contains("leaf"))
        || (url.contains("scans") && url.contains("leaves"))
    {
        PlantPart::LeafScan
    } else {
        PlantPart::Entire
    }
}

/// Path component of a URL, without query or fragment. Falls back to the
/// raw string when it does not parse as an absolute URL.
fn url_path(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

/// True when the URL points at an SVG file. Vector images are never
/// downloaded or recorded.
pub fn is_vector_image(url: &str) -> bool {
    url_path(url).to_lowercase().ends_with(".svg")
}

/// File extension of the URL's last path segment, as written in the URL.
pub fn image_extension(url: &str) -> Option<String> {
    let path = url_path(url);
    Path::new(&path)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}
