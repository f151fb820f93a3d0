//! Typed access to the string attributes of one source record

use chrono::NaiveDate;
use grisbi2ledger_parser::Element;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::types::RecordKind;

/// Value the source format writes for an absent string or date
pub const NULL_SENTINEL: &str = "(null)";

/// Fractional digits of every supported amount
pub const AMOUNT_SCALE: u32 = 2;

/// One record with its kind, decoding attributes on demand
pub struct Record<'a> {
    kind: RecordKind,
    element: &'a Element,
}

impl<'a> Record<'a> {
    pub fn new(kind: RecordKind, element: &'a Element) -> Self {
        Self { kind, element }
    }

    /// Raw attribute text, required
    pub fn text(&self, attribute: &'static str) -> CoreResult<&'a str> {
        self.element
            .attr(attribute)
            .ok_or(CoreError::MissingAttribute {
                kind: self.kind,
                position: self.element.position,
                attribute,
            })
    }

    /// Free text where the sentinel, an empty value or a missing attribute
    /// all mean "absent"
    pub fn optional_text(&self, attribute: &'static str) -> Option<String> {
        match self.element.attr(attribute) {
            None | Some(NULL_SENTINEL) | Some("") => None,
            Some(value) => Some(value.to_string()),
        }
    }

    /// Required non-negative integer
    pub fn number(&self, attribute: &'static str) -> CoreResult<u32> {
        let value = self.text(attribute)?;
        value
            .trim()
            .parse::<u32>()
            .map_err(|e| self.invalid(attribute, value, e.to_string()))
    }

    /// Reference to another record, where 0 means none
    pub fn reference(&self, attribute: &'static str) -> CoreResult<Option<u32>> {
        Ok(Some(self.number(attribute)?).filter(|n| *n != 0))
    }

    /// Signed integer code of an enumeration
    pub fn code(&self, attribute: &'static str) -> CoreResult<i64> {
        let value = self.text(attribute)?;
        value
            .trim()
            .parse::<i64>()
            .map_err(|e| self.invalid(attribute, value, e.to_string()))
    }

    /// 0/1 flag
    pub fn flag(&self, attribute: &'static str) -> CoreResult<bool> {
        match self.code(attribute)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(self.unsupported(attribute, &other.to_string(), "expected 0 or 1")),
        }
    }

    /// Money amount with at most two fractional digits, normalised to two
    pub fn amount(&self, attribute: &'static str) -> CoreResult<Decimal> {
        let mut value = self.decimal(attribute)?;
        if value.scale() > AMOUNT_SCALE {
            let raw = self.text(attribute)?;
            return Err(self.unsupported(
                attribute,
                raw,
                "amounts with more than two decimal places are not supported",
            ));
        }
        value.rescale(AMOUNT_SCALE);
        Ok(value)
    }

    /// Decimal of any scale
    pub fn decimal(&self, attribute: &'static str) -> CoreResult<Decimal> {
        let value = self.text(attribute)?;
        Decimal::from_str(value.trim()).map_err(|e| self.invalid(attribute, value, e.to_string()))
    }

    /// `M/D/YYYY` date, or `None` for the sentinel
    pub fn date(&self, attribute: &'static str) -> CoreResult<Option<NaiveDate>> {
        let value = self.text(attribute)?;
        if value == NULL_SENTINEL {
            return Ok(None);
        }
        parse_date(value)
            .map(Some)
            .ok_or_else(|| self.invalid(attribute, value, "expected month/day/year".to_string()))
    }

    pub fn invalid(&self, attribute: &'static str, value: &str, reason: String) -> CoreError {
        CoreError::InvalidValue {
            kind: self.kind,
            position: self.element.position,
            attribute,
            value: value.to_string(),
            reason,
        }
    }

    pub fn unsupported(&self, attribute: &'static str, value: &str, reason: &str) -> CoreError {
        CoreError::NotSupported {
            kind: self.kind,
            position: self.element.position,
            attribute,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Parse a slash-separated month/day/year date
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let mut parts = value.trim().split('/');
    let month = parts.next()?.parse::<u32>().ok()?;
    let day = parts.next()?.parse::<u32>().ok()?;
    let year = parts.next()?.parse::<i32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}
