//! Field names, target types and bound values of the pattern kit system.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::{Competition, Fixture, Resolution, Season, Team};

/// The entity a pattern kit produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Event,
    VideoFileSource,
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event => f.write_str("Event"),
            Self::VideoFileSource => f.write_str("VideoFileSource"),
        }
    }
}

/// A semantic field a capture group can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    // Event metadata
    HomeTeam,
    AwayTeam,
    Competition,
    Season,
    Fixture,
    Date,

    // VideoFileSource metadata
    Channel,
    Source,
    #[serde(alias = "duration")]
    ApproximateDuration,
    Languages,
    #[serde(alias = "container")]
    MediaContainer,
    VideoCodec,
    AudioCodec,
    Resolution,
    AudioChannels,
    VideoBitrate,
    AudioBitrate,
    Filesize,
    Framerate,
}

impl FieldName {
    /// The entity this field belongs to.
    #[must_use]
    pub fn target(&self) -> TargetType {
        match self {
            Self::HomeTeam
            | Self::AwayTeam
            | Self::Competition
            | Self::Season
            | Self::Fixture
            | Self::Date => TargetType::Event,
            _ => TargetType::VideoFileSource,
        }
    }

    /// Kind of value the field holds once bound.
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::HomeTeam | Self::AwayTeam => FieldKind::Team,
            Self::Competition => FieldKind::Competition,
            Self::Season => FieldKind::Season,
            Self::Fixture => FieldKind::Fixture,
            Self::Date => FieldKind::Date,
            Self::Resolution => FieldKind::Resolution,
            Self::AudioChannels => FieldKind::Channels,
            Self::VideoBitrate | Self::AudioBitrate | Self::Filesize | Self::Framerate => {
                FieldKind::Integer
            }
            Self::Channel
            | Self::Source
            | Self::ApproximateDuration
            | Self::Languages
            | Self::MediaContainer
            | Self::VideoCodec
            | Self::AudioCodec => FieldKind::Text,
        }
    }

    /// The snake_case name used in data source files.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HomeTeam => "home_team",
            Self::AwayTeam => "away_team",
            Self::Competition => "competition",
            Self::Season => "season",
            Self::Fixture => "fixture",
            Self::Date => "date",
            Self::Channel => "channel",
            Self::Source => "source",
            Self::ApproximateDuration => "approximate_duration",
            Self::Languages => "languages",
            Self::MediaContainer => "media_container",
            Self::VideoCodec => "video_codec",
            Self::AudioCodec => "audio_codec",
            Self::Resolution => "resolution",
            Self::AudioChannels => "audio_channels",
            Self::VideoBitrate => "video_bitrate",
            Self::AudioBitrate => "audio_bitrate",
            Self::Filesize => "filesize",
            Self::Framerate => "framerate",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of field values, used to check parser/field combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Team,
    Competition,
    Season,
    Fixture,
    Date,
    Resolution,
    /// Non-negative integer (bitrates, filesize, framerate).
    Integer,
    /// Audio channel count derived from a layout string.
    Channels,
}

/// A typed value produced from one capture group.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Team(Team),
    Competition(Competition),
    Season(Season),
    Fixture(Fixture),
    Date(NaiveDateTime),
    Resolution(Resolution),
    Integer(u64),
    Channels(u32),
}

impl FieldValue {
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Team(_) => FieldKind::Team,
            Self::Competition(_) => FieldKind::Competition,
            Self::Season(_) => FieldKind::Season,
            Self::Fixture(_) => FieldKind::Fixture,
            Self::Date(_) => FieldKind::Date,
            Self::Resolution(_) => FieldKind::Resolution,
            Self::Integer(_) => FieldKind::Integer,
            Self::Channels(_) => FieldKind::Channels,
        }
    }
}
