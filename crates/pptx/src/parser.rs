//! PPTX file parser implementation.

use pptxer_core::{Error, PresentationDocument, PresentationFormat, Result, Slide};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS: &str = "ppt/_rels/presentation.xml.rels";

/// Line break inside a paragraph (`a:br`).
const LINE_BREAK: char = '\u{b}';

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Open and parse the presentation at `path`.
    ///
    /// Distinguishes a missing file, a legacy `.ppt`, and content that is not
    /// a ZIP package at all before handing over to [`PptxParser::parse`].
    pub fn parse_file(&self, path: &Path) -> Result<PresentationDocument> {
        if !path.is_file() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }

        let mut reader = BufReader::new(File::open(path)?);
        let mut magic = Vec::with_capacity(8);
        (&mut reader).take(8).read_to_end(&mut magic)?;
        reader.seek(SeekFrom::Start(0))?;

        match PresentationFormat::from_magic(&magic) {
            Some(PresentationFormat::Pptx) => self.parse(reader, path),
            Some(PresentationFormat::Ppt) => Err(Error::UnsupportedFormat(format!(
                "{} is a legacy PPT file",
                path.display()
            ))),
            None => Err(Error::CorruptedFile(format!(
                "{} is not a ZIP package",
                path.display()
            ))),
        }
    }

    /// Parse a PPTX package from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R, path: &Path) -> Result<PresentationDocument> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::CorruptedFile(format!("Failed to open ZIP: {}", e)))?;

        let mut presentation = PresentationDocument::new(path);

        let slide_order = self.get_slide_order(&mut archive)?;
        log::debug!("{}: {} slides", path.display(), slide_order.len());

        for slide_path in &slide_order {
            let slide = self.parse_slide(&mut archive, slide_path)?;
            presentation.add_slide(slide);
        }

        Ok(presentation)
    }

    /// Get the ordered list of slide part names.
    ///
    /// Uses `p:sldIdLst` from presentation.xml; falls back to the slide
    /// relationships sorted by number when the list is missing.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let slide_rels: Vec<Relationship> = self
            .read_relationships(archive, PRESENTATION_RELS, PRESENTATION_PART)?
            .ok_or_else(|| {
                Error::ZipError(format!("File not found in archive '{}'", PRESENTATION_RELS))
            })?
            .into_iter()
            .filter(|rel| rel.rel_type.ends_with("/slide"))
            .collect();

        let content = self.read_file_from_archive(archive, PRESENTATION_PART)?;
        let slide_ids = extract_slide_ids(&content)?;

        if !slide_ids.is_empty() {
            let targets: HashMap<&str, &str> = slide_rels
                .iter()
                .map(|rel| (rel.id.as_str(), rel.target.as_str()))
                .collect();
            return slide_ids
                .iter()
                .map(|id| {
                    targets.get(id.as_str()).map(|t| t.to_string()).ok_or_else(|| {
                        Error::CorruptedFile(format!("Slide relationship '{}' is missing", id))
                    })
                })
                .collect();
        }

        let mut slides: Vec<(String, Option<usize>)> = slide_rels
            .into_iter()
            .map(|rel| {
                let order_num =
                    extract_slide_number(&rel.target).or_else(|| extract_slide_number(&rel.id));
                (rel.target, order_num)
            })
            .collect();

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    /// Parse a single slide and its notes from the archive.
    fn parse_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
    ) -> Result<Slide> {
        let content = self.read_file_from_archive(archive, slide_path)?;
        let body_text: String = extract_shapes_from_xml(&content)?
            .into_iter()
            .map(|shape| shape.text)
            .collect();

        let note_text = match self.notes_path(archive, slide_path)? {
            Some(notes_path) => match self.try_read_file_from_archive(archive, &notes_path)? {
                Some(notes) => extract_shapes_from_xml(&notes)?
                    .into_iter()
                    .find(|shape| shape.placeholder.as_deref() == Some("body"))
                    .map(|shape| shape.text)
                    .unwrap_or_default(),
                None => {
                    log::debug!("Notes part {} referenced but missing", notes_path);
                    String::new()
                }
            },
            None => String::new(),
        };

        Ok(Slide::new(body_text, note_text))
    }

    /// Locate the notes slide related to `slide_path`, if any.
    fn notes_path<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
    ) -> Result<Option<String>> {
        let rels_path = relationships_part_for(slide_path);
        let rels = self
            .read_relationships(archive, &rels_path, slide_path)?
            .unwrap_or_default();
        Ok(rels
            .into_iter()
            .find(|rel| rel.rel_type.ends_with("/notesSlide"))
            .map(|rel| rel.target))
    }

    /// Read a relationships part, resolving targets against `source_part`.
    ///
    /// Returns `None` when the part does not exist.
    fn read_relationships<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        rels_path: &str,
        source_part: &str,
    ) -> Result<Option<Vec<Relationship>>> {
        let rels_content = match self.try_read_file_from_archive(archive, rels_path)? {
            Some(content) => content,
            None => return Ok(None),
        };

        let mut relationships = Vec::new();
        let mut reader = Reader::from_str(&rels_content);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"Relationship" =>
                {
                    let mut rel_type = String::new();
                    let mut target = String::new();
                    let mut id = String::new();
                    let mut external = false;

                    for attr in e.attributes().flatten() {
                        let value = String::from_utf8_lossy(&attr.value).to_string();
                        match attr.key.as_ref() {
                            b"Type" => rel_type = value,
                            b"Target" => target = value,
                            b"Id" => id = value,
                            b"TargetMode" => external = value == "External",
                            _ => {}
                        }
                    }

                    if !external && !target.is_empty() {
                        relationships.push(Relationship {
                            id,
                            rel_type,
                            target: resolve_target(source_part, &target),
                        });
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing relationships '{}': {}",
                        rels_path, e
                    )));
                }
                _ => {}
            }
        }

        Ok(Some(relationships))
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        self.try_read_file_from_archive(archive, path)?
            .ok_or_else(|| Error::ZipError(format!("File not found in archive '{}'", path)))
    }

    /// Read a file from the ZIP archive, `None` when it is absent.
    fn try_read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<Option<String>> {
        let mut file = match archive.by_name(path) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(Error::ZipError(format!("Failed to open '{}': {}", path, e))),
        };

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(Some(content))
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// A package relationship with its target resolved to a part name.
#[derive(Debug, Clone)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
}

/// Text of a top-level shape.
#[derive(Debug, Default)]
struct ShapeInfo {
    text: String,
    /// Placeholder type (`title`, `body`, ...) when the shape is a placeholder.
    placeholder: Option<String>,
}

/// Collect the relationship ids of `p:sldIdLst` in document order.
fn extract_slide_ids(xml_content: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                // The relationship id is the namespaced `r:id`, not the plain numeric `id`.
                for attr in e.attributes().flatten() {
                    let key = attr.key.as_ref();
                    if key.contains(&b':') && local_name(key) == b"id" {
                        ids.push(String::from_utf8_lossy(&attr.value).to_string());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation.xml: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Extract the text of every top-level shape (`p:sp`) of a slide part.
///
/// Shapes inside group shapes and graphic frames are not top-level and are
/// skipped. Paragraphs are joined with `\n`.
fn extract_shapes_from_xml(xml_content: &str) -> Result<Vec<ShapeInfo>> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);

    let mut group_depth = 0usize;
    let mut current_shape: Option<ShapeInfo> = None;
    let mut in_text_body = false;
    let mut in_text_run = false;
    let mut paragraphs = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlError(format!("Error parsing slide: {}", e)))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"grpSp" if !is_empty => group_depth += 1,
                    b"sp" if group_depth == 0 && current_shape.is_none() => {
                        if is_empty {
                            shapes.push(ShapeInfo::default());
                        } else {
                            current_shape = Some(ShapeInfo::default());
                            paragraphs = 0;
                        }
                    }
                    b"ph" => {
                        if let Some(ref mut shape) = current_shape {
                            shape.placeholder = Some(placeholder_type(e));
                        }
                    }
                    b"txBody" if current_shape.is_some() && !is_empty => in_text_body = true,
                    b"p" if in_text_body => {
                        if let Some(ref mut shape) = current_shape {
                            if paragraphs > 0 {
                                shape.text.push('\n');
                            }
                            paragraphs += 1;
                        }
                    }
                    b"br" if in_text_body => {
                        if let Some(ref mut shape) = current_shape {
                            shape.text.push(LINE_BREAK);
                        }
                    }
                    b"t" if in_text_body && !is_empty => in_text_run = true,
                    _ => {}
                }
            }
            Event::Text(ref e) => {
                if in_text_run {
                    if let Some(ref mut shape) = current_shape {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::XmlError(format!("Invalid text: {}", e)))?;
                        shape.text.push_str(&text);
                    }
                }
            }
            Event::End(ref e) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"grpSp" => group_depth = group_depth.saturating_sub(1),
                    b"sp" if group_depth == 0 => {
                        if let Some(shape) = current_shape.take() {
                            shapes.push(shape);
                        }
                        in_text_body = false;
                        in_text_run = false;
                    }
                    b"txBody" => in_text_body = false,
                    b"t" => in_text_run = false,
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}

/// The `type` of a `p:ph` element. An absent type means an object placeholder.
fn placeholder_type(e: &BytesStart) -> String {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"type")
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
        .unwrap_or_else(|| "obj".to_string())
}

/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`
fn relationships_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that declares it.
fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:cSld><p:spTree>
<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
<p:txBody><a:bodyPr/><a:p><a:r><a:t>Hello </a:t></a:r><a:r><a:t>World</a:t></a:r></a:p></p:txBody></p:sp>
<p:sp><p:nvSpPr><p:cNvPr id="3" name="Rect"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp>
<p:grpSp><p:sp><p:txBody><a:p><a:r><a:t>grouped</a:t></a:r></a:p></p:txBody></p:sp></p:grpSp>
<p:sp><p:nvSpPr><p:cNvPr id="4" name="Body"/><p:cNvSpPr/><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr>
<p:txBody><a:bodyPr/><a:p><a:r><a:t>one &amp; two</a:t></a:r><a:br/><a:r><a:t>three</a:t></a:r></a:p><a:p/><a:p><a:r><a:t>four</a:t></a:r></a:p></p:txBody></p:sp>
</p:spTree></p:cSld>
</p:sld>"#;

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_top_level_shapes_in_order() {
        let shapes = extract_shapes_from_xml(SLIDE_XML).unwrap();
        let texts: Vec<&str> = shapes.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello World", "", "one & two\u{b}three\n\nfour"]);
        assert_eq!(shapes[0].placeholder.as_deref(), Some("title"));
        assert_eq!(shapes[1].placeholder, None);
        assert_eq!(shapes[2].placeholder.as_deref(), Some("body"));
    }

    #[test]
    fn test_malformed_xml_is_error() {
        let err = extract_shapes_from_xml("<p:sld><p:sp></p:sld>").unwrap_err();
        assert!(matches!(err, Error::XmlError(_)));
    }

    #[test]
    fn test_slide_ids_use_relationship_attribute() {
        let xml = r#"<p:presentation xmlns:p="p" xmlns:r="r"><p:sldIdLst>
            <p:sldId id="257" r:id="rId3"/><p:sldId id="256" r:id="rId2"/>
        </p:sldIdLst></p:presentation>"#;
        assert_eq!(extract_slide_ids(xml).unwrap(), vec!["rId3", "rId2"]);
    }

    #[test]
    fn test_relationships_part_for() {
        assert_eq!(
            relationships_part_for("ppt/slides/slide1.xml"),
            "ppt/slides/_rels/slide1.xml.rels"
        );
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("ppt/slides/slide1.xml", "../notesSlides/notesSlide1.xml"),
            "ppt/notesSlides/notesSlide1.xml"
        );
        assert_eq!(
            resolve_target("ppt/presentation.xml", "slides/slide2.xml"),
            "ppt/slides/slide2.xml"
        );
        assert_eq!(
            resolve_target("ppt/presentation.xml", "/ppt/slides/slide3.xml"),
            "ppt/slides/slide3.xml"
        );
    }

    #[test]
    fn test_parse_file_missing() {
        let err = PptxParser::new()
            .parse_file(Path::new("/definitely/not/here.pptx"))
            .unwrap_err();
        assert!(matches!(err, Error::MissingFile(_)));
    }

    #[test]
    fn test_parse_rejects_non_zip() {
        let err = PptxParser::new()
            .parse(std::io::Cursor::new(b"not a zip".to_vec()), Path::new("x.pptx"))
            .unwrap_err();
        assert!(matches!(err, Error::CorruptedFile(_)));
        assert!(err.is_parse_error());
    }
}
