//! Shapes of the extraction output.

use pptxer_core::{
    calculate_length_stats, LabeledLengthStats, LengthStats, PresentationDocument, Result, Slide,
};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Label appended to the flattened body-text statistics keys.
pub const BODY_TEXT_LABEL: &str = "BodyText";

/// Label appended to the flattened notes statistics keys.
pub const NOTES_TEXT_LABEL: &str = "NotesText";

/// Per-presentation result with slides kept as a list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedResult {
    pub path: PathBuf,
    pub slides: Vec<Slide>,
    pub body_text_length_stats: LengthStats,
    pub note_text_length_stats: LengthStats,
}

/// Per-presentation result with every field at the top level.
///
/// Serializes as `path`, `slide{i}BodyText`..., `slide{i}NoteText`...,
/// then the labeled body and notes statistics, in that order.
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedResult {
    pub path: PathBuf,
    pub body_texts: Vec<String>,
    pub note_texts: Vec<String>,
    pub body_text_stats: LabeledLengthStats,
    pub note_text_stats: LabeledLengthStats,
}

impl Serialize for FlattenedResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = 1 + self.body_texts.len() + self.note_texts.len() + 10;
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("path", &self.path)?;
        for (i, text) in self.body_texts.iter().enumerate() {
            map.serialize_entry(&format!("slide{}BodyText", i), text)?;
        }
        for (i, text) in self.note_texts.iter().enumerate() {
            map.serialize_entry(&format!("slide{}NoteText", i), text)?;
        }
        for (key, value) in self.body_text_stats.fields().chain(self.note_text_stats.fields()) {
            map.serialize_entry(&key, &value)?;
        }
        map.end()
    }
}

/// Extraction result for one presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractionResult {
    Nested(NestedResult),
    Flattened(FlattenedResult),
}

impl ExtractionResult {
    pub fn path(&self) -> &Path {
        match self {
            ExtractionResult::Nested(r) => &r.path,
            ExtractionResult::Flattened(r) => &r.path,
        }
    }
}

/// Results of one extraction call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractionOutput {
    /// All results concatenated in input order.
    Combined(Vec<ExtractionResult>),
    /// One group of results per input path.
    PerPath(Vec<Vec<ExtractionResult>>),
}

impl ExtractionOutput {
    /// Iterate over every result regardless of grouping.
    pub fn results(&self) -> Box<dyn Iterator<Item = &ExtractionResult> + '_> {
        match self {
            ExtractionOutput::Combined(results) => Box::new(results.iter()),
            ExtractionOutput::PerPath(groups) => Box::new(groups.iter().flatten()),
        }
    }

    /// Total number of presentations extracted.
    pub fn len(&self) -> usize {
        self.results().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the nested result. Fails for a presentation without slides.
pub fn build_nested(document: &PresentationDocument) -> Result<NestedResult> {
    Ok(NestedResult {
        path: document.path.clone(),
        slides: document.slides.clone(),
        body_text_length_stats: calculate_length_stats(&document.body_texts())?,
        note_text_length_stats: calculate_length_stats(&document.note_texts())?,
    })
}

/// Build the flattened result. Fails for a presentation without slides.
pub fn build_flattened(document: &PresentationDocument) -> Result<FlattenedResult> {
    let body_texts = document.body_texts();
    let note_texts = document.note_texts();
    Ok(FlattenedResult {
        path: document.path.clone(),
        body_text_stats: calculate_length_stats(&body_texts)?.labeled(BODY_TEXT_LABEL),
        note_text_stats: calculate_length_stats(&note_texts)?.labeled(NOTES_TEXT_LABEL),
        body_texts: body_texts.into_iter().map(str::to_string).collect(),
        note_texts: note_texts.into_iter().map(str::to_string).collect(),
    })
}
