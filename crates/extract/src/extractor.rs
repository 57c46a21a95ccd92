//! Extraction pipeline: resolve input paths, parse, shape and persist.

use crate::result::{build_flattened, build_nested, ExtractionOutput, ExtractionResult};
use pptxer_core::{ensure_path_correctness, Error, PresentationFormat, Result};
use pptxer_pptx::PptxParser;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// How results are shaped, grouped and stored.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Concatenate results of all input paths into one array.
    pub single_array_result: bool,

    /// Hoist per-slide fields and statistics to the top level.
    pub flatten_fields: bool,

    /// JSON destination. A timestamped file name is used when `None`.
    pub output_file_path: Option<PathBuf>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            single_array_result: true,
            flatten_fields: false,
            output_file_path: None,
        }
    }
}

/// Extract the text of every presentation under `paths` and write the
/// result as JSON.
///
/// Files that are missing or cannot be parsed are logged and left out, so
/// the output may hold fewer presentations than were requested.
pub fn extract_presentations_texts(
    paths: &[PathBuf],
    options: &ExtractOptions,
) -> Result<ExtractionOutput> {
    if paths.is_empty() {
        return Err(Error::InvalidArgument(
            "at least one presentation path is required".to_string(),
        ));
    }

    let output_file = match &options.output_file_path {
        Some(path) => path.clone(),
        None => {
            let path = default_output_file_in(Path::new(""))?;
            log::info!(
                "Since no extract output was specified, the output will be written to {}",
                path.display()
            );
            path
        }
    };
    log::info!(
        "Will start extracting presentation texts with paths = {:?}, \
         single_array_result = {}, flatten_fields = {}, output = {}",
        paths,
        options.single_array_result,
        options.flatten_fields,
        output_file.display()
    );

    let per_path: Vec<Vec<ExtractionResult>> = paths
        .iter()
        .map(|path| extract_presentation_texts_from_path(path, options.flatten_fields))
        .collect();

    let output = if options.single_array_result {
        ExtractionOutput::Combined(per_path.into_iter().flatten().collect())
    } else {
        ExtractionOutput::PerPath(per_path)
    };

    write_output(&output_file, &output)?;
    log::info!("Extracted {} presentations to {}", output.len(), output_file.display());
    Ok(output)
}

/// Extract every presentation reachable from one path.
pub fn extract_presentation_texts_from_path(
    path: &Path,
    flatten_fields: bool,
) -> Vec<ExtractionResult> {
    let parser = PptxParser::new();

    collect_presentation_files(path)
        .into_iter()
        .filter_map(|file| match extract_presentation(&parser, &file, flatten_fields) {
            Ok(result) => {
                log::debug!("Loaded {} successfully", file.display());
                Some(result)
            }
            Err(e) => {
                report_skipped(&file, &e);
                None
            }
        })
        .collect()
}

/// Resolve `path` to presentation files.
///
/// Directories are walked recursively in name order and filtered by
/// extension; a regular file is returned as is.
pub fn collect_presentation_files(path: &Path) -> Vec<PathBuf> {
    if path.is_dir() {
        log::debug!(
            "{} is a directory. Will collect all presentations within it",
            path.display()
        );
        let mut files = Vec::new();
        walk_dir(path, &mut files);
        files
    } else if path.exists() {
        vec![path.to_path_buf()]
    } else {
        report_skipped(path, &Error::MissingFile(path.to_path_buf()));
        Vec::new()
    }
}

/// Symlinked directories are not descended into, so link cycles terminate.
fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) {
    let mut entries: Vec<(PathBuf, bool)> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| {
                let is_real_dir = e.file_type().is_ok_and(|t| t.is_dir());
                (e.path(), is_real_dir)
            })
            .collect(),
        Err(e) => {
            log::error!("Unable to read directory {}: {}", dir.display(), e);
            return;
        }
    };
    entries.sort();

    for (entry, is_real_dir) in entries {
        if is_real_dir {
            walk_dir(&entry, files);
        } else if entry.is_dir() {
            log::debug!("Not following directory symlink {}", entry.display());
        } else if has_presentation_extension(&entry) {
            files.push(entry);
        }
    }
}

fn has_presentation_extension(path: &Path) -> bool {
    PresentationFormat::from_path(path) == Some(PresentationFormat::Pptx)
}

fn extract_presentation(
    parser: &PptxParser,
    file: &Path,
    flatten_fields: bool,
) -> Result<ExtractionResult> {
    let document = parser.parse_file(file)?;
    if document.slides.is_empty() {
        return Err(Error::InvalidInput(format!(
            "{} has no slides to extract",
            file.display()
        )));
    }

    if flatten_fields {
        Ok(ExtractionResult::Flattened(build_flattened(&document)?))
    } else {
        Ok(ExtractionResult::Nested(build_nested(&document)?))
    }
}

fn report_skipped(path: &Path, error: &Error) {
    match error {
        Error::MissingFile(_) => log::error!("File {} does not exist", path.display()),
        e if e.is_parse_error() => log::error!(
            "Unable to process {}. It is likely to be corrupted or incomplete. \
             Please ensure the input is a valid pptx file ({})",
            path.display(),
            e
        ),
        e => log::warn!("{}", e),
    }
    log::info!("Will skip {} due to an error", path.display());
}

/// `presentations_text_<timestamp>.json` in the working directory.
pub fn default_output_file_path() -> PathBuf {
    PathBuf::from(format!(
        "presentations_text_{}.json",
        chrono::Local::now().format("%Y%m%dT%H%M%S")
    ))
}

/// Timestamped output path under `dir` that no existing file occupies.
///
/// Two runs within the same second get `_1`, `_2`... suffixes.
fn default_output_file_in(dir: &Path) -> Result<PathBuf> {
    ensure_path_correctness(&dir.join(default_output_file_path()))
}

/// Write `output` as compact JSON, keeping non-ASCII text verbatim.
fn write_output(path: &Path, output: &ExtractionOutput) -> Result<()> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, output)?;
    writer.flush()?;
    Ok(())
}
