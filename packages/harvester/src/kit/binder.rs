//! Binding capture groups to typed values.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use regex::Captures;

use super::registry::ValueParser;
use super::types::{FieldKind, FieldName, FieldValue};
use crate::error::{HarvesterError, Result};
use crate::types::{Competition, ExtractionWarning, Fixture, Resolution, Season, Team};

/// Outcome of binding one capture group.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// Group unmapped, out of range, unmatched or empty.
    Absent,
    /// Text captured but rejected by the field's parser.
    Unparsable(String),
    Value(FieldValue),
}

/// Extracts capture groups and turns them into typed values.
pub struct FieldBinder;

impl FieldBinder {
    /// Raw text of a capture group.
    ///
    /// # Returns
    /// `None` if `group` is 0, beyond the match's group count, did not
    /// participate in the match, or captured empty text.
    #[must_use]
    pub fn capture<'t>(caps: &Captures<'t>, group: usize) -> Option<&'t str> {
        if group == 0 || group >= caps.len() {
            return None;
        }
        caps.get(group)
            .map(|m| m.as_str())
            .filter(|text| !text.is_empty())
    }

    /// Bind a capture group through the field's parser.
    #[must_use]
    pub fn bind(caps: &Captures<'_>, group: usize, parser: ValueParser) -> Binding {
        match Self::capture(caps, group) {
            None => Binding::Absent,
            Some(raw) => match parser(raw) {
                Some(value) => Binding::Value(value),
                None => Binding::Unparsable(raw.to_string()),
            },
        }
    }
}

/// The bound fields of one pattern match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: BTreeMap<FieldName, FieldValue>,
    unparsable: BTreeMap<FieldName, String>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a binding; absent bindings leave the record unchanged.
    pub fn insert(&mut self, field: FieldName, binding: Binding) {
        match binding {
            Binding::Absent => {}
            Binding::Unparsable(raw) => {
                self.unparsable.insert(field, raw);
            }
            Binding::Value(value) => {
                self.values.insert(field, value);
            }
        }
    }

    #[must_use]
    pub fn get(&self, field: FieldName) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.unparsable.is_empty()
    }

    /// Captured text a parser rejected.
    #[must_use]
    pub fn unparsable(&self, field: FieldName) -> Option<&str> {
        self.unparsable.get(&field).map(String::as_str)
    }

    /// Warning describing why `field` falls back to its default.
    #[must_use]
    pub fn default_warning(&self, field: FieldName) -> ExtractionWarning {
        match self.unparsable(field) {
            Some(raw) => ExtractionWarning::unparsable(field, raw),
            None => ExtractionWarning::absent(field),
        }
    }

    pub fn text(&self, field: FieldName) -> Result<Option<String>> {
        self.typed(field, FieldKind::Text, |v| match v {
            FieldValue::Text(s) => Some(s.clone()),
            _ => None,
        })
    }

    pub fn team(&self, field: FieldName) -> Result<Option<Team>> {
        self.typed(field, FieldKind::Team, |v| match v {
            FieldValue::Team(t) => Some(t.clone()),
            _ => None,
        })
    }

    pub fn competition(&self, field: FieldName) -> Result<Option<Competition>> {
        self.typed(field, FieldKind::Competition, |v| match v {
            FieldValue::Competition(c) => Some(c.clone()),
            _ => None,
        })
    }

    pub fn season(&self, field: FieldName) -> Result<Option<Season>> {
        self.typed(field, FieldKind::Season, |v| match v {
            FieldValue::Season(s) => Some(*s),
            _ => None,
        })
    }

    pub fn fixture(&self, field: FieldName) -> Result<Option<Fixture>> {
        self.typed(field, FieldKind::Fixture, |v| match v {
            FieldValue::Fixture(f) => Some(f.clone()),
            _ => None,
        })
    }

    pub fn date(&self, field: FieldName) -> Result<Option<NaiveDateTime>> {
        self.typed(field, FieldKind::Date, |v| match v {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        })
    }

    pub fn resolution(&self, field: FieldName) -> Result<Option<Resolution>> {
        self.typed(field, FieldKind::Resolution, |v| match v {
            FieldValue::Resolution(r) => Some(*r),
            _ => None,
        })
    }

    pub fn integer(&self, field: FieldName) -> Result<Option<u64>> {
        self.typed(field, FieldKind::Integer, |v| match v {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        })
    }

    pub fn channels(&self, field: FieldName) -> Result<Option<u32>> {
        self.typed(field, FieldKind::Channels, |v| match v {
            FieldValue::Channels(n) => Some(*n),
            _ => None,
        })
    }

    /// Look up a value of the expected kind.
    ///
    /// A stored value of another kind means the kit's parser does not
    /// construct the field's type, which is a configuration error.
    fn typed<T>(
        &self,
        field: FieldName,
        expected: FieldKind,
        extract: impl FnOnce(&FieldValue) -> Option<T>,
    ) -> Result<Option<T>> {
        let Some(value) = self.values.get(&field) else {
            return Ok(None);
        };
        extract(value).map(Some).ok_or_else(|| {
            HarvesterError::Configuration(format!(
                "field '{field}' expects a {expected:?} value but its parser produced {:?}",
                value.kind()
            ))
        })
    }
}
