//! Group metadata sidecars by observation id.
//!
//! Reads every `.xml` file in a directory, pulls out `<ObservationId>` and
//! produces one `observation|media, media, ...` line per observation.

use std::collections::BTreeMap;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::types::{HarvestError, HarvestResult};

/// Observation id → media ids (sidecar file stems), in file name order.
pub type ObservationIndex = BTreeMap<String, Vec<String>>;

/// Default name of the rendered index file.
pub const INDEX_FILE_NAME: &str = "output.txt";

/// Text of the first `<ObservationId>` element, if any.
pub fn read_observation_id(xml: &str) -> HarvestResult<Option<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_observation = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                in_observation = e.local_name().as_ref() == b"ObservationId";
            }
            Ok(Event::Text(e)) if in_observation => {
                let text = e.unescape().unwrap_or_default().trim().to_string();
                return Ok(Some(text));
            }
            Ok(Event::End(e)) => {
                if in_observation && e.local_name().as_ref() == b"ObservationId" {
                    // <ObservationId></ObservationId>
                    return Ok(Some(String::new()));
                }
                in_observation = false;
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(HarvestError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
}

fn is_sidecar(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xml"))
}

/// Index every sidecar in `dir`. Files that do not parse or carry no
/// observation id are skipped.
pub fn build_index(dir: &Path) -> HarvestResult<ObservationIndex> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    paths.retain(|p| is_sidecar(p));
    paths.sort();

    let mut index = ObservationIndex::new();
    for path in paths {
        let xml = std::fs::read_to_string(&path)?;
        let observation_id = match read_observation_id(&xml) {
            Ok(Some(id)) if !id.is_empty() => id,
            Ok(_) => {
                tracing::debug!("No observation id in {}", path.display());
                continue;
            }
            Err(e) => {
                tracing::warn!("Skipping {}: {e}", path.display());
                continue;
            }
        };

        let media_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        index.entry(observation_id).or_default().push(media_id);
    }

    tracing::info!("Indexed {} observation(s) in {}", index.len(), dir.display());
    Ok(index)
}

/// Render the index as `observation|media, media` lines.
pub fn render_index(index: &ObservationIndex) -> String {
    index
        .iter()
        .map(|(observation, media)| format!("{observation}|{}\n", media.join(", ")))
        .collect()
}

/// Build the index for `dir` and write it to `output`.
pub fn write_index(dir: &Path, output: &Path) -> HarvestResult<ObservationIndex> {
    let index = build_index(dir)?;
    std::fs::write(output, render_index(&index))?;
    Ok(index)
}
