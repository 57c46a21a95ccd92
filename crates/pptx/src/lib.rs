//! PPTX (Office Open XML) parser backend for slide text extraction.
//!
//! Parses .pptx files which are ZIP archives containing XML documents, and
//! reads the body text of every slide together with its speaker notes.

pub mod parser;

pub use parser::PptxParser;
