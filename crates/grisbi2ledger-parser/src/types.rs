//! Labelled record tree produced by the reader

use std::collections::HashMap;

/// Attribute name/value store of one element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(HashMap<String, String>);

impl Attributes {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: String, value: String) {
        self.0.insert(key, value);
    }
}

impl From<Vec<(String, String)>> for Attributes {
    fn from(v: Vec<(String, String)>) -> Self {
        Attributes(v.into_iter().collect())
    }
}

/// One node of the tree: a tag, its attributes and its children in document order
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attributes: Attributes,
    pub children: Vec<Element>,
    /// Byte offset of the start tag in the source document
    pub position: usize,
}

impl Element {
    pub fn new(tag: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            tag: tag.into(),
            attributes,
            children: Vec::new(),
            position: 0,
        }
    }

    /// Attribute value by name
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }
}
