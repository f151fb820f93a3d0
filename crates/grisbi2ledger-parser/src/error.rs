//! Error types for grisbi2ledger-parser

use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Syntax error at byte {position}: {message}")]
    SyntaxError {
        position: usize,
        message: String,
    },

    #[error("Unexpected root element: expected <{expected}>, found <{found}>")]
    UnexpectedRoot { expected: String, found: String },

    #[error("Document has no root element")]
    EmptyDocument,

    #[error("Closing tag </{found}> does not match open element <{expected}>")]
    MismatchedTag { expected: String, found: String },

    #[error("Document ended inside element <{tag}>")]
    UnclosedElement { tag: String },

    #[error("Could not read input: {0}")]
    IoError(#[from] io::Error),
}
