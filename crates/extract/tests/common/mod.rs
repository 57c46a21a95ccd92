#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;

/// Body shapes and optional notes of one generated slide.
pub struct SlideContent {
    pub shapes: Vec<String>,
    pub notes: Option<String>,
}

impl SlideContent {
    pub fn new(shapes: &[&str], notes: Option<&str>) -> Self {
        Self {
            shapes: shapes.iter().map(|s| s.to_string()).collect(),
            notes: notes.map(str::to_string),
        }
    }
}

const SLIDE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const NOTES_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";

pub fn create_test_pptx(slides: &[SlideContent]) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buffer);
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(CONTENT_TYPES_XML.as_bytes()).unwrap();

        zip.start_file("ppt/presentation.xml", options).unwrap();
        zip.write_all(generate_presentation_xml(slides.len()).as_bytes())
            .unwrap();

        zip.start_file("ppt/_rels/presentation.xml.rels", options)
            .unwrap();
        zip.write_all(generate_presentation_rels(slides.len()).as_bytes())
            .unwrap();

        for (i, slide) in slides.iter().enumerate() {
            let n = i + 1;
            zip.start_file(format!("ppt/slides/slide{}.xml", n), options)
                .unwrap();
            zip.write_all(generate_slide_xml(&slide.shapes).as_bytes())
                .unwrap();

            if let Some(notes) = &slide.notes {
                zip.start_file(format!("ppt/slides/_rels/slide{}.xml.rels", n), options)
                    .unwrap();
                zip.write_all(generate_slide_rels(n).as_bytes()).unwrap();

                zip.start_file(format!("ppt/notesSlides/notesSlide{}.xml", n), options)
                    .unwrap();
                zip.write_all(generate_notes_xml(notes).as_bytes()).unwrap();
            }
        }

        zip.finish().unwrap();
    }
    buffer.into_inner()
}

/// Write a generated presentation to `dir/name` and return its path.
pub fn write_pptx(dir: &Path, name: &str, slides: &[SlideContent]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, create_test_pptx(slides)).unwrap();
    path
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

fn generate_presentation_xml(slide_count: usize) -> String {
    let ids: String = (1..=slide_count)
        .map(|n| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, n))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldIdLst>{}</p:sldIdLst></p:presentation>"#,
        ids
    )
}

fn generate_presentation_rels(slide_count: usize) -> String {
    let rels: String = (1..=slide_count)
        .map(|n| {
            format!(
                r#"<Relationship Id="rId{}" Type="{}" Target="slides/slide{}.xml"/>"#,
                n, SLIDE_REL, n
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        rels
    )
}

fn generate_slide_rels(n: usize) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{}" Target="../notesSlides/notesSlide{}.xml"/></Relationships>"#,
        NOTES_REL, n
    )
}

fn shape_xml(id: usize, text: &str, placeholder: Option<&str>) -> String {
    let ph = placeholder
        .map(|t| format!(r#"<p:ph type="{}" idx="1"/>"#, t))
        .unwrap_or_default();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="Shape {}"/><p:cNvSpPr/><p:nvPr>{}</p:nvPr></p:nvSpPr><p:txBody><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#,
        id,
        id,
        ph,
        escape(text)
    )
}

fn generate_slide_xml(shapes: &[String]) -> String {
    let body: String = shapes
        .iter()
        .enumerate()
        .map(|(i, text)| shape_xml(i + 2, text, None))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>"#,
        body
    )
}

fn generate_notes_xml(notes: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:notes xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree>{}{}</p:spTree></p:cSld></p:notes>"#,
        shape_xml(2, "", Some("sldImg")),
        shape_xml(3, notes, Some("body"))
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
