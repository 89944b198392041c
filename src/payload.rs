//! GOST ST00012 payload construction and validation

use crate::amount;
use crate::error::{Error, Result};
use crate::fields::{FieldName, PaymentFields};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Format header that opens every payload.
pub const FORMAT_HEADER: &str = "ST00012";

/// Separator between payload segments.
pub const SEPARATOR: char = '|';

/// An immutable payment payload string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(String);

impl Payload {
    /// The payload text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Key=Value` segments following the header.
    pub fn segments(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0
            .split(SEPARATOR)
            .skip(1)
            .map(|segment| segment.split_once('=').unwrap_or((segment, "")))
    }

    /// Consume the payload, returning its text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Payload {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Result of building a payload from a form record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// The payload, built even when validation fails
    pub payload: Payload,
    /// Required fields that are empty after trimming
    pub errors: BTreeSet<FieldName>,
}

impl BuildOutcome {
    /// True when no required field is empty.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether a particular field failed validation.
    pub fn has_error(&self, field: FieldName) -> bool {
        self.errors.contains(&field)
    }

    /// Return the payload, or a validation error listing the empty fields.
    pub fn require_valid(&self) -> Result<&Payload> {
        if self.is_valid() {
            Ok(&self.payload)
        } else {
            Err(Error::Validation(self.errors.iter().copied().collect()))
        }
    }
}

/// Validate the record and build its payload.
///
/// Sum is written in kopecks and only when non-empty. Separator characters
/// inside values are dropped so the segment layout stays intact.
pub fn build_payload(fields: &PaymentFields) -> BuildOutcome {
    let errors: BTreeSet<FieldName> = fields
        .iter()
        .filter(|(field, value)| field.is_required() && value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

    let mut text = String::from(FORMAT_HEADER);
    for (field, value) in fields.iter() {
        let value = if field == FieldName::Sum {
            match amount::to_minor_units(value) {
                Some(kopecks) => kopecks,
                None => continue,
            }
        } else {
            value.to_string()
        };

        text.push(SEPARATOR);
        text.push_str(field.key());
        text.push('=');
        text.extend(value.chars().filter(|c| *c != SEPARATOR));
    }

    tracing::debug!(
        valid = errors.is_empty(),
        invalid_fields = errors.len(),
        length = text.len(),
        "Built payment payload"
    );

    BuildOutcome {
        payload: Payload(text),
        errors,
    }
}
