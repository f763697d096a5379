//! Reader/Writer traits and format dispatch
//!
//! Graph documents are read and written through small format objects chosen
//! by file extension. JSON and YAML are registered by default.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::document::GraphDocument;
use crate::error::LayoutError;

/// Errors that can occur during reading or writing
#[derive(Error, Debug)]
pub enum IoError {
    /// The file format is not supported
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The file extension could not be determined
    #[error("could not determine file format from path: {0}")]
    UnknownExtension(String),

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A parsing error occurred
    #[error("parse error: {0}")]
    Parse(String),

    /// A serialization/writing error occurred
    #[error("write error: {0}")]
    Write(String),

    /// The document or configuration was read but is not usable
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Result type for reader/writer operations
pub type IoResult<T> = Result<T, IoError>;

/// A reader parses an input file into a graph document
pub trait Reader {
    /// Parse the input file
    fn read(&self, input: &Path) -> IoResult<GraphDocument>;

    /// File extensions this reader can handle (e.g., ["yaml", "yml"])
    fn supported_extensions(&self) -> &[&str];

    /// Check if this reader can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// A writer serializes a graph document to a file
pub trait Writer {
    /// Write the document to the output path
    fn write(&self, document: &GraphDocument, output: &Path) -> IoResult<()>;

    /// Identifier for this output format (e.g., "json", "yaml")
    fn format_id(&self) -> &str;

    /// File extensions this writer produces
    fn supported_extensions(&self) -> &[&str];

    fn supports_extension(&self, ext: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// JSON documents, written with two-space indentation
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormat;

impl Reader for JsonFormat {
    fn read(&self, input: &Path) -> IoResult<GraphDocument> {
        let content = fs::read_to_string(input)?;
        serde_json::from_str(&content).map_err(|e| IoError::Parse(e.to_string()))
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }
}

impl Writer for JsonFormat {
    fn write(&self, document: &GraphDocument, output: &Path) -> IoResult<()> {
        let mut json = serde_json::to_string_pretty(document)
            .map_err(|e| IoError::Write(format!("JSON serialization failed: {e}")))?;
        json.push('\n');
        fs::write(output, json)?;
        Ok(())
    }

    fn format_id(&self) -> &str {
        "json"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }
}

/// YAML documents
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlFormat;

impl Reader for YamlFormat {
    fn read(&self, input: &Path) -> IoResult<GraphDocument> {
        let content = fs::read_to_string(input)?;
        serde_yaml::from_str(&content).map_err(|e| IoError::Parse(e.to_string()))
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}

impl Writer for YamlFormat {
    fn write(&self, document: &GraphDocument, output: &Path) -> IoResult<()> {
        let yaml = serde_yaml::to_string(document)
            .map_err(|e| IoError::Write(format!("YAML serialization failed: {e}")))?;
        fs::write(output, yaml)?;
        Ok(())
    }

    fn format_id(&self) -> &str {
        "yaml"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}

/// Registry of available readers and writers
pub struct FormatRegistry {
    readers: Vec<Box<dyn Reader>>,
    writers: Vec<Box<dyn Writer>>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            readers: Vec::new(),
            writers: Vec::new(),
        }
    }

    /// Create a registry with JSON and YAML registered for both directions
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_reader(Box::new(JsonFormat));
        registry.register_reader(Box::new(YamlFormat));
        registry.register_writer(Box::new(JsonFormat));
        registry.register_writer(Box::new(YamlFormat));
        registry
    }

    pub fn register_reader(&mut self, reader: Box<dyn Reader>) {
        self.readers.push(reader);
    }

    pub fn register_writer(&mut self, writer: Box<dyn Writer>) {
        self.writers.push(writer);
    }

    /// Find a reader for the given file extension
    pub fn reader_for_extension(&self, ext: &str) -> Option<&dyn Reader> {
        self.readers
            .iter()
            .find(|r| r.supports_extension(ext))
            .map(|r| r.as_ref())
    }

    /// Get file extension from a path
    pub fn extension_from_path(path: &Path) -> Option<&str> {
        path.extension().and_then(|e| e.to_str())
    }

    /// Find a reader for the given path based on its extension
    pub fn reader_for_path(&self, path: &Path) -> IoResult<&dyn Reader> {
        let ext = Self::extension_from_path(path)
            .ok_or_else(|| IoError::UnknownExtension(path.display().to_string()))?;

        self.reader_for_extension(ext)
            .ok_or_else(|| IoError::UnsupportedFormat(ext.to_string()))
    }

    /// Find a writer for the given path based on its extension
    pub fn writer_for_path(&self, path: &Path) -> IoResult<&dyn Writer> {
        let ext = Self::extension_from_path(path)
            .ok_or_else(|| IoError::UnknownExtension(path.display().to_string()))?;

        self.writers
            .iter()
            .find(|w| w.supports_extension(ext))
            .map(|w| w.as_ref())
            .ok_or_else(|| IoError::UnsupportedFormat(ext.to_string()))
    }
}
