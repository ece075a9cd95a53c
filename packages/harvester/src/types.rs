//! Core data types for the harvester.
//!
//! These are the transient parse products: an [`Event`] with its
//! [`VideoFileSource`]s, each holding ordered [`VideoFilePack`]s of
//! [`VideoFile`]s. Ownership passes to the caller once extraction returns.

mod fixture;
mod season;
mod video;

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::kit::FieldName;

pub use fixture::Fixture;
pub use season::Season;
pub use video::{PartIdentifier, Resolution, VideoFile, VideoFilePack, VideoFileSource};

/// A competition (league, cup, tournament).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Competition {
    pub name: String,
}

impl From<&str> for Competition {
    fn from(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
        }
    }
}

impl fmt::Display for Competition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A team taking part in an Event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Team {
    pub name: String,
}

impl From<&str> for Team {
    fn from(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A field whose value was substituted with its documented default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionWarning {
    /// The field that was defaulted.
    pub field: FieldName,

    /// The captured text that could not be used, if any was captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl ExtractionWarning {
    /// A field that was not captured at all.
    #[must_use]
    pub fn absent(field: FieldName) -> Self {
        Self { field, raw: None }
    }

    /// A field whose captured text could not be parsed.
    #[must_use]
    pub fn unparsable(field: FieldName, raw: impl Into<String>) -> Self {
        Self {
            field,
            raw: Some(raw.into()),
        }
    }
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.raw {
            Some(raw) => write!(f, "{}: unparsable value '{raw}', default used", self.field),
            None => write!(f, "{}: not captured, default used", self.field),
        }
    }
}

/// A sporting event extracted from one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competition: Option<Competition>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_team: Option<Team>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub away_team: Option<Team>,

    pub season: Season,

    pub fixture: Fixture,

    /// Start of the day the event took place.
    pub date: NaiveDateTime,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_sources: Vec<VideoFileSource>,

    /// Defaults substituted during extraction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ExtractionWarning>,
}

impl Event {
    /// Whether the given field was defaulted rather than extracted.
    #[must_use]
    pub fn was_defaulted(&self, field: FieldName) -> bool {
        self.warnings.iter().any(|w| w.field == field)
    }

    /// An event is usable when both its competition and date were actually extracted.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.competition.is_some() && !self.was_defaulted(FieldName::Date)
    }

    /// Append file sources discovered elsewhere (e.g. on a detail page).
    pub fn add_file_sources(&mut self, sources: impl IntoIterator<Item = VideoFileSource>) {
        self.file_sources.extend(sources);
    }

    /// Short human-readable title, e.g. "Man City vs Man Utd".
    #[must_use]
    pub fn title(&self) -> String {
        match (&self.home_team, &self.away_team) {
            (Some(home), Some(away)) => format!("{home} vs {away}"),
            (Some(team), None) | (None, Some(team)) => team.to_string(),
            (None, None) => self
                .competition
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}
