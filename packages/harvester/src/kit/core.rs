//! Pattern kits: a compiled regex plus a capture-group-to-field mapping.

use std::collections::{BTreeMap, HashSet};

use regex::{Captures, Regex};

use super::binder::{FieldBinder, Record};
use super::registry::{ParserRegistry, ValueParser, DEFAULT_REGISTRY};
use super::types::{FieldName, TargetType};
use crate::error::{HarvesterError, Result};
use crate::types::PartIdentifier;

/// Part-identifier tokens searched for near video links when a kit names none.
pub const DEFAULT_PART_IDENTIFIER_PATTERN: &str =
    r"(?i)\b(pre\w*|1st|first|2nd|second|extra[- ]?time|penalt\w*|post\w*|trophy)";

#[derive(Debug, Clone, Copy)]
struct BoundField {
    name: FieldName,
    parser: ValueParser,
}

/// An immutable extraction rule.
///
/// Every mapped group index is checked against the pattern's capture-group
/// count, and every field against the kit's target type, when the kit is built.
#[derive(Debug, Clone)]
pub struct PatternKit {
    pattern: Regex,
    fields: BTreeMap<usize, BoundField>,
    target: TargetType,
}

impl PatternKit {
    /// Compile a kit using the default parser registry.
    ///
    /// # Errors
    /// Returns a configuration error for an invalid regex, a group index of 0
    /// or beyond the pattern's group count, a field that does not belong to
    /// `target`, or a field mapped twice.
    pub fn new(
        pattern: &str,
        fields: BTreeMap<usize, FieldName>,
        target: TargetType,
    ) -> Result<Self> {
        Self::with_registry(pattern, fields, target, &DEFAULT_REGISTRY)
    }

    /// Compile a kit, resolving each field's parser from `registry`.
    pub fn with_registry(
        pattern: &str,
        fields: BTreeMap<usize, FieldName>,
        target: TargetType,
        registry: &ParserRegistry,
    ) -> Result<Self> {
        let pattern = Regex::new(pattern)?;
        let group_count = pattern.captures_len() - 1;

        let mut seen = HashSet::new();
        let mut bound = BTreeMap::new();
        for (index, name) in fields {
            if index == 0 {
                return Err(HarvesterError::Configuration(format!(
                    "field '{name}' is mapped to group 0, which is the whole match"
                )));
            }
            if index > group_count {
                return Err(HarvesterError::Configuration(format!(
                    "field '{name}' is mapped to group {index} but the pattern has only {group_count} group(s)"
                )));
            }
            if name.target() != target {
                return Err(HarvesterError::Configuration(format!(
                    "field '{name}' does not belong to {target}"
                )));
            }
            if !seen.insert(name) {
                return Err(HarvesterError::Configuration(format!(
                    "field '{name}' is mapped to more than one group"
                )));
            }
            let parser = registry.get_parser(name).ok_or_else(|| {
                HarvesterError::Configuration(format!("no parser registered for field '{name}'"))
            })?;
            bound.insert(index, BoundField { name, parser });
        }

        Ok(Self {
            pattern,
            fields: bound,
            target,
        })
    }

    #[must_use]
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    #[must_use]
    pub fn target(&self) -> TargetType {
        self.target
    }

    /// Mapped fields in group order.
    pub fn fields(&self) -> impl Iterator<Item = (usize, FieldName)> + '_ {
        self.fields.iter().map(|(index, f)| (*index, f.name))
    }

    /// Group index a field is mapped to; `None` means unmapped.
    #[must_use]
    pub fn group_of(&self, field: FieldName) -> Option<usize> {
        self.fields
            .iter()
            .find(|(_, f)| f.name == field)
            .map(|(index, _)| *index)
    }

    /// Bind the first match in `text`.
    #[must_use]
    pub fn first(&self, text: &str) -> Option<Record> {
        self.pattern.captures(text).map(|caps| self.bind(&caps))
    }

    /// Bind every non-overlapping match in `text`, in document order.
    pub fn records<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Record> + 'a {
        self.pattern
            .captures_iter(text)
            .map(move |caps| self.bind(&caps))
    }

    fn bind(&self, caps: &Captures<'_>) -> Record {
        let mut record = Record::new();
        for (index, field) in &self.fields {
            record.insert(field.name, FieldBinder::bind(caps, *index, field.parser));
        }
        record
    }
}

/// Pattern kit producing Event metadata.
#[derive(Debug, Clone)]
pub struct EventMetadataPatternKit {
    kit: PatternKit,
}

impl EventMetadataPatternKit {
    /// Compile an Event-metadata kit.
    pub fn new(pattern: &str, fields: BTreeMap<usize, FieldName>) -> Result<Self> {
        Ok(Self {
            kit: PatternKit::new(pattern, fields, TargetType::Event)?,
        })
    }

    #[must_use]
    pub fn kit(&self) -> &PatternKit {
        &self.kit
    }

    #[must_use]
    pub fn home_team(&self) -> Option<usize> {
        self.kit.group_of(FieldName::HomeTeam)
    }

    #[must_use]
    pub fn away_team(&self) -> Option<usize> {
        self.kit.group_of(FieldName::AwayTeam)
    }

    #[must_use]
    pub fn competition(&self) -> Option<usize> {
        self.kit.group_of(FieldName::Competition)
    }

    #[must_use]
    pub fn season(&self) -> Option<usize> {
        self.kit.group_of(FieldName::Season)
    }

    #[must_use]
    pub fn fixture(&self) -> Option<usize> {
        self.kit.group_of(FieldName::Fixture)
    }

    #[must_use]
    pub fn date(&self) -> Option<usize> {
        self.kit.group_of(FieldName::Date)
    }
}

/// Pattern kit producing VideoFileSource metadata, with the patterns used
/// to find its video links.
#[derive(Debug, Clone)]
pub struct FileSourceMetadataPatternKit {
    kit: PatternKit,
    video_url: Regex,
    part_identifier: Regex,
}

impl FileSourceMetadataPatternKit {
    /// Compile a file-source kit.
    ///
    /// # Arguments
    /// * `pattern` - Metadata pattern, matched repeatedly per document
    /// * `fields` - Capture group to field mapping
    /// * `video_url` - Pattern an anchor's `href` must match to be a video link
    /// * `part_identifier` - Pattern whose first group names the part of a link;
    ///   defaults to [`DEFAULT_PART_IDENTIFIER_PATTERN`]
    pub fn new(
        pattern: &str,
        fields: BTreeMap<usize, FieldName>,
        video_url: &str,
        part_identifier: Option<&str>,
    ) -> Result<Self> {
        let kit = PatternKit::new(pattern, fields, TargetType::VideoFileSource)?;
        let video_url = Regex::new(video_url)?;
        let part_identifier =
            Regex::new(part_identifier.unwrap_or(DEFAULT_PART_IDENTIFIER_PATTERN))?;
        if part_identifier.captures_len() < 2 {
            return Err(HarvesterError::Configuration(format!(
                "part identifier pattern '{part_identifier}' needs a capture group"
            )));
        }

        Ok(Self {
            kit,
            video_url,
            part_identifier,
        })
    }

    #[must_use]
    pub fn kit(&self) -> &PatternKit {
        &self.kit
    }

    #[must_use]
    pub fn group(&self, field: FieldName) -> Option<usize> {
        self.kit.group_of(field)
    }

    #[must_use]
    pub fn video_url(&self) -> &Regex {
        &self.video_url
    }

    #[must_use]
    pub fn is_video_link(&self, href: &str) -> bool {
        self.video_url.is_match(href)
    }

    /// Part identifier named in `text`, if any.
    #[must_use]
    pub fn part_identifier(&self, text: &str) -> Option<PartIdentifier> {
        self.part_identifier
            .captures(text)
            .and_then(|caps| FieldBinder::capture(&caps, 1))
            .and_then(PartIdentifier::from_token)
    }
}

/// One Event kit with the file-source kits that accompany it.
#[derive(Debug, Clone)]
pub struct PatternKitSet {
    pub event: EventMetadataPatternKit,
    pub file_sources: Vec<FileSourceMetadataPatternKit>,
}
