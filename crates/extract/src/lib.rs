//! Presentation-to-structured-text extraction.
//!
//! Every slide yields its body text and speaker notes. Results come in a
//! nested or a flattened shape, both annotated with length statistics.

pub mod extractor;
pub mod result;

pub use extractor::{
    collect_presentation_files, default_output_file_path, extract_presentation_texts_from_path,
    extract_presentations_texts, ExtractOptions,
};
pub use result::{
    build_flattened, build_nested, ExtractionOutput, ExtractionResult, FlattenedResult,
    NestedResult,
};
