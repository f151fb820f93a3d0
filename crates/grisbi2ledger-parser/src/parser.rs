//! XML reader for Grisbi files

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::ParseError;
use crate::types::{Attributes, Element};

/// Streaming reader that builds an [`Element`] tree from XML text
pub struct SimpleGrisbiParser;

impl SimpleGrisbiParser {
    /// Parse a whole document and return its root element
    pub fn parse(content: &str) -> Result<Element, ParseError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut reader = Reader::from_str(content);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let position = reader.buffer_position();
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    stack.push(Self::element(&start, position)?);
                }
                Ok(Event::Empty(start)) => {
                    let element = Self::element(&start, position)?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(end)) => {
                    let found = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    let element = stack.pop().ok_or_else(|| ParseError::SyntaxError {
                        position,
                        message: format!("unexpected closing tag </{}>", found),
                    })?;
                    if element.tag != found {
                        return Err(ParseError::MismatchedTag {
                            expected: element.tag,
                            found,
                        });
                    }
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Eof) => break,
                // Text, comments, declarations and processing instructions carry no records
                Ok(_) => {}
                Err(e) => {
                    return Err(ParseError::SyntaxError {
                        position: reader.buffer_position(),
                        message: e.to_string(),
                    })
                }
            }
        }

        if let Some(open) = stack.pop() {
            return Err(ParseError::UnclosedElement { tag: open.tag });
        }

        root.ok_or(ParseError::EmptyDocument)
    }

    /// Parse a document and require a specific root tag
    pub fn parse_rooted(content: &str, expected_root: &str) -> Result<Element, ParseError> {
        let root = Self::parse(content)?;
        if root.tag != expected_root {
            return Err(ParseError::UnexpectedRoot {
                expected: expected_root.to_string(),
                found: root.tag,
            });
        }
        log::debug!(
            "Parsed <{}> with {} direct children",
            root.tag,
            root.children.len()
        );
        Ok(root)
    }

    fn element(start: &BytesStart<'_>, position: usize) -> Result<Element, ParseError> {
        let tag = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| ParseError::SyntaxError {
                position,
                message: format!("tag name is not UTF-8: {}", e),
            })?
            .to_string();

        let mut attributes = Attributes::default();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ParseError::SyntaxError {
                position,
                message: e.to_string(),
            })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| ParseError::SyntaxError {
                    position,
                    message: format!("attribute {} on <{}>: {}", key, tag, e),
                })?
                .into_owned();
            attributes.insert(key, value);
        }

        Ok(Element {
            tag,
            attributes,
            children: Vec::new(),
            position,
        })
    }

    fn attach(
        stack: &mut Vec<Element>,
        root: &mut Option<Element>,
        element: Element,
    ) -> Result<(), ParseError> {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(element);
            return Ok(());
        }
        if root.is_some() {
            return Err(ParseError::SyntaxError {
                position: element.position,
                message: format!("second root element <{}>", element.tag),
            });
        }
        *root = Some(element);
        Ok(())
    }
}
