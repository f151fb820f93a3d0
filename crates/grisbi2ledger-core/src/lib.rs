//! Core conversion logic
//!
//! Loads a Grisbi record tree into a [`Book`], checks it, folds splits and
//! transfers into single entries, and writes the result as a Ledger journal.

pub mod book;
pub mod collapse;
pub mod error;
pub mod fields;
mod format;
pub mod loader;
pub mod models;
pub mod render;
pub mod types;
pub mod validate;

#[cfg(test)]
mod testutil;

use grisbi2ledger_config::LedgerConfig;
use grisbi2ledger_parser::{DefaultSourceParser, Element, ParserRef};
use std::path::Path;
use std::sync::Arc;

pub use book::Book;
pub use collapse::{collapse, CollapseSummary};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorSeverity};
pub use loader::Loader;
pub use render::LedgerWriter;
pub use validate::{validate, Check, Finding, ValidationReport};

// ==================== Conversion Pipeline ====================

/// Outcome of a conversion that got past loading
#[derive(Debug)]
pub enum Conversion {
    /// The complete journal text
    Rendered(String),
    /// The graph failed validation; nothing was rendered
    Rejected(ValidationReport),
}

/// Runs load, validate, collapse and render in sequence
pub struct Converter {
    config: LedgerConfig,
    parser: ParserRef,
}

impl Converter {
    pub fn new(config: LedgerConfig) -> Self {
        Self::with_parser(config, Arc::new(DefaultSourceParser))
    }

    pub fn with_parser(config: LedgerConfig, parser: ParserRef) -> Self {
        Self { config, parser }
    }

    /// Convert an already parsed document
    pub fn convert(&self, root: &Element) -> CoreResult<Conversion> {
        let mut book = Loader::load(root)?;

        let report = validate(&book);
        if !report.is_valid() {
            for finding in &report.findings {
                log::warn!("{}", finding);
            }
            log::error!("Validation failed with {} findings", report.len());
            return Ok(Conversion::Rejected(report));
        }
        log::info!("Validation passed");

        collapse(&mut book);

        let journal = LedgerWriter::new(&book, &self.config).render_to_string()?;
        Ok(Conversion::Rendered(journal))
    }

    /// Convert document text
    pub fn convert_str(&self, content: &str) -> CoreResult<Conversion> {
        let root = self.parser.parse(content)?;
        self.convert(&root)
    }

    /// Convert the document at `path`
    pub fn convert_file(&self, path: &Path) -> CoreResult<Conversion> {
        log::info!("Reading {}", path.display());
        let root = self.parser.parse_file(path)?;
        self.convert(&root)
    }
}
