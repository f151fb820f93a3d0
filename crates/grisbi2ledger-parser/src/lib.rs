//! Grisbi file reader
//!
//! Turns a `.gsb` XML document into a tree of labelled records, each with a
//! tag name and string attributes, in document order. Interpreting the
//! records is left to the core crate.

use std::path::Path;
use std::sync::Arc;

pub mod error;
pub mod types;
pub mod parser;

pub use error::ParseError;
pub use parser::SimpleGrisbiParser;
pub use types::{Attributes, Element};

/// Root tag of a Grisbi document
pub const GRISBI_ROOT: &str = "Grisbi";

// ==================== Parser Trait ====================

/// Parser reference type
pub type ParserRef = Arc<dyn SourceParser>;

/// Trait for source document parsers
pub trait SourceParser: Send + Sync {
    /// Parse document text and return its root element
    fn parse(&self, content: &str) -> Result<Element, ParseError>;

    /// Parse from a file path
    fn parse_file(&self, path: &Path) -> Result<Element, ParseError> {
        let content = std::fs::read_to_string(path)?;
        log::debug!("Read {} bytes from {}", content.len(), path.display());
        self.parse(&content)
    }
}

/// Default parser implementation, expecting a `<Grisbi>` root
#[derive(Debug, Default)]
pub struct DefaultSourceParser;

impl SourceParser for DefaultSourceParser {
    fn parse(&self, content: &str) -> Result<Element, ParseError> {
        SimpleGrisbiParser::parse_rooted(content, GRISBI_ROOT)
    }
}
