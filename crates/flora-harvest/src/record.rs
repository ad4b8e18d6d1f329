//! PlantCLEF metadata records and their XML sidecar form.

use std::fmt::Write as _;

use chrono::NaiveDate;
use quick_xml::escape::escape;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::RecordDefaults;
use crate::types::PlantPart;

/// Inclusive range of the random `Vote` field.
pub const VOTE_RANGE: (u32, u32) = (5, 10);

/// Inclusive range of the random `ClassId` field.
pub const CLASS_ID_RANGE: (u32, u32) = (1, 32000);

/// Sidecar metadata describing one saved image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub observation_id: String,
    pub file_name: String,
    pub media_id: String,
    pub vote: u32,
    pub content: PlantPart,
    pub class_id: u32,
    pub family: String,
    pub species: String,
    pub genus: String,
    pub author: String,
    pub date: NaiveDate,
    pub year_in_clef: String,
    pub learn_tag: String,
}

impl MetadataRecord {
    /// Build the record for image number `counter` of `term`, drawing fresh
    /// random vote and class id values.
    pub fn new<R: Rng + ?Sized>(
        term: &str,
        counter: usize,
        file_name: &str,
        content: PlantPart,
        defaults: &RecordDefaults,
        date: NaiveDate,
        rng: &mut R,
    ) -> Self {
        Self {
            observation_id: term.to_string(),
            file_name: file_name.to_string(),
            media_id: media_id(term, counter),
            vote: rng.gen_range(VOTE_RANGE.0..=VOTE_RANGE.1),
            content,
            class_id: rng.gen_range(CLASS_ID_RANGE.0..=CLASS_ID_RANGE.1),
            // Taxonomy is not looked up; the term stands in for all three.
            family: term.to_string(),
            species: term.to_string(),
            genus: term.to_string(),
            author: defaults.author.clone(),
            date,
            year_in_clef: defaults.year_in_clef.clone(),
            learn_tag: defaults.learn_tag.clone(),
        }
    }

    /// Render the record as the XML sidecar document.
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(768);
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str("<Image>\n");
        push_element(&mut out, "ObservationId", &self.observation_id);
        push_element(&mut out, "FileName", &self.file_name);
        push_element(&mut out, "MediaId", &self.media_id);
        push_element(&mut out, "Vote", &self.vote.to_string());
        push_element(&mut out, "Content", self.content.as_str());
        push_element(&mut out, "ClassId", &self.class_id.to_string());
        push_element(&mut out, "Family", &self.family);
        push_element(&mut out, "Species", &self.species);
        push_element(&mut out, "Genus", &self.genus);
        push_element(&mut out, "Author", &self.author);
        push_element(&mut out, "Date", &self.date.format("%d/%m/%y").to_string());
        push_empty(&mut out, "Location");
        push_empty(&mut out, "Latitude");
        push_empty(&mut out, "Longitude");
        push_element(&mut out, "YearInCLEF", &self.year_in_clef);
        push_empty(&mut out, "IndividualPlantId2015");
        push_empty(&mut out, "ImageID2015");
        push_element(&mut out, "LearnTag", &self.learn_tag);
        out.push_str("</Image>\n");
        out
    }
}

/// `{term}{counter}`, also the stem of both output file names.
pub fn media_id(term: &str, counter: usize) -> String {
    format!("{term}{counter}")
}

fn push_element(out: &mut String, name: &str, text: &str) {
    let _ = writeln!(out, "  <{name}>{}</{name}>", escape(text));
}

fn push_empty(out: &mut String, name: &str) {
    let _ = writeln!(out, "  <{name} />");
}
