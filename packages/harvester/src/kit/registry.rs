//! Parser registry mapping field names to typed value parsers.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};

use super::types::{FieldName, FieldValue};
use crate::config::EVENT_DATE_FORMAT;
use crate::types::{Competition, Fixture, Resolution, Season, Team};

/// Turns the raw text of one capture group into a typed value.
///
/// Returns `None` when the text cannot be parsed into the field's type.
pub type ValueParser = fn(&str) -> Option<FieldValue>;

/// Shared registry with the parsers for every known field.
pub(crate) static DEFAULT_REGISTRY: LazyLock<ParserRegistry> =
    LazyLock::new(create_default_registry);

/// Registry mapping field names to parsers.
///
/// Looked up once when a pattern kit is compiled; a field without a parser
/// makes the kit invalid.
#[derive(Debug, Clone)]
pub struct ParserRegistry {
    parsers: HashMap<FieldName, ValueParser>,
}

impl ParserRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Register a parser for a field, replacing any previous one.
    pub fn register(&mut self, field: FieldName, parser: ValueParser) {
        self.parsers.insert(field, parser);
    }

    /// Get the parser for a field.
    #[must_use]
    pub fn get_parser(&self, field: FieldName) -> Option<ValueParser> {
        self.parsers.get(&field).copied()
    }

    /// Check if a parser is registered for a field.
    #[must_use]
    pub fn has_parser(&self, field: FieldName) -> bool {
        self.parsers.contains_key(&field)
    }

    /// Return set of all registered fields.
    #[must_use]
    pub fn registered_fields(&self) -> HashSet<FieldName> {
        self.parsers.keys().copied().collect()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        create_default_registry()
    }
}

/// Create a registry with parsers for every [`FieldName`].
#[must_use]
pub fn create_default_registry() -> ParserRegistry {
    let mut registry = ParserRegistry::new();

    // Event metadata
    registry.register(FieldName::HomeTeam, parse_team);
    registry.register(FieldName::AwayTeam, parse_team);
    registry.register(FieldName::Competition, parse_competition);
    registry.register(FieldName::Season, |s| Season::parse(s).map(FieldValue::Season));
    registry.register(FieldName::Fixture, |s| Fixture::parse(s).map(FieldValue::Fixture));
    registry.register(FieldName::Date, parse_event_date);

    // Free-text file source metadata
    for field in [
        FieldName::Channel,
        FieldName::Source,
        FieldName::ApproximateDuration,
        FieldName::Languages,
        FieldName::MediaContainer,
        FieldName::VideoCodec,
        FieldName::AudioCodec,
    ] {
        registry.register(field, parse_text);
    }

    // Numeric file source metadata
    registry.register(FieldName::Resolution, |s| {
        Resolution::classify(s).map(FieldValue::Resolution)
    });
    registry.register(FieldName::AudioChannels, parse_audio_channels);
    for field in [
        FieldName::VideoBitrate,
        FieldName::AudioBitrate,
        FieldName::Filesize,
        FieldName::Framerate,
    ] {
        registry.register(field, parse_integer);
    }

    registry
}

fn parse_text(raw: &str) -> Option<FieldValue> {
    let text = raw.trim();
    (!text.is_empty()).then(|| FieldValue::Text(text.to_string()))
}

fn parse_team(raw: &str) -> Option<FieldValue> {
    let team = Team::from(raw);
    (!team.name.is_empty()).then_some(FieldValue::Team(team))
}

fn parse_competition(raw: &str) -> Option<FieldValue> {
    let competition = Competition::from(raw);
    (!competition.name.is_empty()).then_some(FieldValue::Competition(competition))
}

fn parse_event_date(raw: &str) -> Option<FieldValue> {
    NaiveDate::parse_from_str(raw.trim(), EVENT_DATE_FORMAT)
        .ok()
        .map(|date| FieldValue::Date(date.and_time(NaiveTime::MIN)))
}

/// Leading integer of the text, e.g. "8000 kbps" is 8000.
fn parse_integer(raw: &str) -> Option<FieldValue> {
    let text = raw.trim();
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse().ok().map(FieldValue::Integer)
}

/// Sum of the dot-separated components of a channel layout, e.g. "5.1" is 6.
fn parse_audio_channels(raw: &str) -> Option<FieldValue> {
    raw.trim()
        .split('.')
        .map(|part| part.trim().parse::<u32>().ok())
        .sum::<Option<u32>>()
        .map(FieldValue::Channels)
}
