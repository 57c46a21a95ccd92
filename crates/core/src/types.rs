//! Domain types shared by the download and extraction pipelines.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File extension of the presentations this tool downloads and reads.
pub const PRESENTATION_EXTENSION: &str = "pptx";

/// A parsed presentation with the text of every slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationDocument {
    /// Path the presentation was loaded from.
    pub path: PathBuf,

    /// Slides in document order.
    pub slides: Vec<Slide>,
}

impl PresentationDocument {
    /// Create an empty presentation for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            slides: Vec::new(),
        }
    }

    /// Add a slide to the presentation.
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    /// Body texts of all slides, in order.
    pub fn body_texts(&self) -> Vec<&str> {
        self.slides.iter().map(|s| s.body_text.as_str()).collect()
    }

    /// Note texts of all slides, in order.
    pub fn note_texts(&self) -> Vec<&str> {
        self.slides.iter().map(|s| s.note_text.as_str()).collect()
    }
}

/// Text of a single slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    /// Speaker notes, or empty when the slide has none.
    pub note_text: String,

    /// Concatenated text of all text-bearing shapes, in shape order.
    pub body_text: String,
}

impl Slide {
    pub fn new(body_text: impl Into<String>, note_text: impl Into<String>) -> Self {
        Self {
            note_text: note_text.into(),
            body_text: body_text.into(),
        }
    }
}

/// The format of a presentation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationFormat {
    /// Modern PPTX (Office Open XML).
    Pptx,
    /// Legacy PPT (OLE/CFB binary).
    Ppt,
}

impl PresentationFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pptx" => Some(Self::Pptx),
            "ppt" => Some(Self::Ppt),
            _ => None,
        }
    }

    /// Detect format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PPTX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        // PPT is an OLE/CFB file (D0 CF 11 E0 A1 B1 1A E1)
        if bytes.len() >= 8
            && bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        {
            return Some(Self::Ppt);
        }

        None
    }
}

/// One previously completed download.
///
/// Valid only while `path` points to an existing file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Source URL the file was fetched from.
    pub url: String,

    /// Local path the response body was written to.
    pub path: PathBuf,
}

impl CacheEntry {
    pub fn new(url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            path: path.into(),
        }
    }

    /// Whether the referenced file still exists.
    pub fn is_valid(&self) -> bool {
        self.path.is_file()
    }
}
