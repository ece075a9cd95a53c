//! Video files, packs and sources.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// "SD" as a standalone token, so words like "Wednesday" do not match.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SD_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsd\b").expect("valid regex"));

/// The role a video file plays within a match broadcast.
///
/// Variants are declared in broadcast order, which is also their sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartIdentifier {
    Default,
    PreMatch,
    FirstHalf,
    SecondHalf,
    ExtraTime,
    TrophyCeremony,
    PostMatch,
}

impl PartIdentifier {
    /// Classify a part-identifier token by case-insensitive substring.
    ///
    /// # Returns
    /// `None` when the token names no known part.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| token.contains(n));

        if has(&["pre"]) {
            Some(Self::PreMatch)
        } else if has(&["1st", "first"]) {
            Some(Self::FirstHalf)
        } else if has(&["2nd", "second"]) {
            Some(Self::SecondHalf)
        } else if has(&["extra", "penalt"]) {
            Some(Self::ExtraTime)
        } else if has(&["post"]) {
            Some(Self::PostMatch)
        } else if has(&["trophy"]) {
            Some(Self::TrophyCeremony)
        } else {
            None
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::PreMatch => "Pre-Match",
            Self::FirstHalf => "1st Half",
            Self::SecondHalf => "2nd Half",
            Self::ExtraTime => "Extra-Time/Penalties",
            Self::TrophyCeremony => "Trophy Ceremony",
            Self::PostMatch => "Post-Match",
        }
    }
}

impl fmt::Display for PartIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Broadcast resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "4K")]
    R4k,
    #[serde(rename = "1080p")]
    R1080p,
    #[serde(rename = "1080i")]
    R1080i,
    #[serde(rename = "720p")]
    R720p,
    #[serde(rename = "576p")]
    R576p,
    #[default]
    #[serde(rename = "SD")]
    Sd,
}

impl Resolution {
    /// All resolutions, in classification order.
    pub const ALL: [Resolution; 6] = [
        Self::R4k,
        Self::R1080p,
        Self::R1080i,
        Self::R720p,
        Self::R576p,
        Self::Sd,
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::R4k => "4K",
            Self::R1080p => "1080p",
            Self::R1080i => "1080i",
            Self::R720p => "720p",
            Self::R576p => "576p",
            Self::Sd => "SD",
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        match self {
            Self::R4k => 3_840,
            Self::R1080p | Self::R1080i => 1_920,
            Self::R720p => 1_280,
            Self::R576p => 768,
            Self::Sd => 640,
        }
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        match self {
            Self::R4k => 2_160,
            Self::R1080p | Self::R1080i => 1_080,
            Self::R720p => 720,
            Self::R576p => 576,
            Self::Sd => 480,
        }
    }

    /// Fuzzy classification: the first resolution whose name occurs in `text`,
    /// ignoring case. SD only matches as a whole word.
    ///
    /// # Examples
    /// ```
    /// use matchday_harvester::types::Resolution;
    ///
    /// assert_eq!(Resolution::classify("HD 1080p 50fps"), Some(Resolution::R1080p));
    /// assert_eq!(Resolution::classify("unknown"), None);
    /// ```
    #[must_use]
    pub fn classify(text: &str) -> Option<Self> {
        let text = text.to_lowercase();
        Self::ALL.into_iter().find(|r| match r {
            Self::Sd => SD_TOKEN.is_match(&text),
            _ => text.contains(&r.name().to_lowercase()),
        })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One downloadable part of a broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFile {
    pub title: PartIdentifier,
    pub external_url: Url,
}

impl VideoFile {
    #[must_use]
    pub fn new(title: PartIdentifier, external_url: Url) -> Self {
        Self {
            title,
            external_url,
        }
    }
}

/// One playable unit: at most one [`VideoFile`] per [`PartIdentifier`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoFilePack {
    files: BTreeMap<PartIdentifier, VideoFile>,
}

impl VideoFilePack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the pack has no file for `part` yet.
    #[must_use]
    pub fn accepts(&self, part: PartIdentifier) -> bool {
        !self.files.contains_key(&part)
    }

    /// Insert a file unless its part is already taken.
    ///
    /// # Returns
    /// `true` if inserted, `false` if the pack already held that part
    /// (the pack is left unchanged).
    pub fn put(&mut self, file: VideoFile) -> bool {
        if !self.accepts(file.title) {
            return false;
        }
        self.files.insert(file.title, file);
        true
    }

    #[must_use]
    pub fn get(&self, part: PartIdentifier) -> Option<&VideoFile> {
        self.files.get(&part)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files in broadcast order.
    pub fn files(&self) -> impl Iterator<Item = &VideoFile> {
        self.files.values()
    }

    /// Part identifiers present, in broadcast order.
    pub fn parts(&self) -> impl Iterator<Item = PartIdentifier> + '_ {
        self.files.keys().copied()
    }
}

/// One quality/channel variant of an Event's broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFileSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub approximate_duration: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_container: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,

    pub resolution: Resolution,

    /// Sum of the channel-layout components, e.g. "5.1" is 6.
    pub audio_channels: u32,

    pub video_bitrate: u64,

    pub audio_bitrate: u64,

    pub filesize: u64,

    pub framerate: u32,

    #[serde(default)]
    pub video_file_packs: Vec<VideoFilePack>,
}

impl VideoFileSource {
    /// First video URL across all packs, in pack order then broadcast order.
    #[must_use]
    pub fn first_video_url(&self) -> Option<&Url> {
        self.video_file_packs
            .iter()
            .flat_map(VideoFilePack::files)
            .map(|f| &f.external_url)
            .next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(part: PartIdentifier, name: &str) -> VideoFile {
        let url = Url::parse(&format!("https://files.example.com/{name}.mkv")).unwrap();
        VideoFile::new(part, url)
    }

    #[test]
    fn test_part_identifier_tokens() {
        assert_eq!(PartIdentifier::from_token("Pre-Match"), Some(PartIdentifier::PreMatch));
        assert_eq!(PartIdentifier::from_token("1st half"), Some(PartIdentifier::FirstHalf));
        assert_eq!(PartIdentifier::from_token("FIRST HALF"), Some(PartIdentifier::FirstHalf));
        assert_eq!(PartIdentifier::from_token("Second"), Some(PartIdentifier::SecondHalf));
        assert_eq!(PartIdentifier::from_token("Penalties"), Some(PartIdentifier::ExtraTime));
        assert_eq!(PartIdentifier::from_token("post"), Some(PartIdentifier::PostMatch));
        assert_eq!(PartIdentifier::from_token("Trophy"), Some(PartIdentifier::TrophyCeremony));
        assert_eq!(PartIdentifier::from_token("highlights"), None);
    }

    #[test]
    fn test_part_identifier_broadcast_order() {
        assert!(PartIdentifier::PreMatch < PartIdentifier::FirstHalf);
        assert!(PartIdentifier::SecondHalf < PartIdentifier::ExtraTime);
        assert!(PartIdentifier::TrophyCeremony < PartIdentifier::PostMatch);
    }

    #[test]
    fn test_resolution_classify() {
        assert_eq!(Resolution::classify("4k UHD"), Some(Resolution::R4k));
        assert_eq!(Resolution::classify("1080I"), Some(Resolution::R1080i));
        assert_eq!(Resolution::classify("720p"), Some(Resolution::R720p));
        assert_eq!(Resolution::classify("sd"), Some(Resolution::Sd));
        assert_eq!(Resolution::classify("HD"), None);
        assert_eq!(Resolution::classify("SD 576i"), Some(Resolution::Sd));
        assert_eq!(Resolution::classify("Wednesday night"), None);
        assert_eq!(Resolution::default(), Resolution::Sd);
    }

    #[test]
    fn test_resolution_dimensions() {
        assert_eq!((Resolution::R4k.width(), Resolution::R4k.height()), (3_840, 2_160));
        assert_eq!((Resolution::R576p.width(), Resolution::R576p.height()), (768, 576));
        assert_eq!((Resolution::Sd.width(), Resolution::Sd.height()), (640, 480));
    }

    #[test]
    fn test_pack_rejects_duplicate_part() {
        let mut pack = VideoFilePack::new();
        assert!(pack.put(file(PartIdentifier::FirstHalf, "a")));
        assert!(!pack.accepts(PartIdentifier::FirstHalf));
        assert!(!pack.put(file(PartIdentifier::FirstHalf, "b")));

        assert_eq!(pack.len(), 1);
        let kept = pack.get(PartIdentifier::FirstHalf).unwrap();
        assert!(kept.external_url.as_str().ends_with("a.mkv"));
    }

    #[test]
    fn test_pack_exposes_entries_independent_of_insertion_order() {
        let parts = [
            PartIdentifier::PostMatch,
            PartIdentifier::PreMatch,
            PartIdentifier::SecondHalf,
            PartIdentifier::FirstHalf,
        ];
        let mut pack = VideoFilePack::new();
        for (i, part) in parts.iter().enumerate() {
            assert!(pack.put(file(*part, &i.to_string())));
        }

        assert_eq!(pack.len(), 4);
        let ordered: Vec<_> = pack.parts().collect();
        assert_eq!(
            ordered,
            [
                PartIdentifier::PreMatch,
                PartIdentifier::FirstHalf,
                PartIdentifier::SecondHalf,
                PartIdentifier::PostMatch
            ]
        );
        for part in parts {
            assert_eq!(pack.get(part).unwrap().title, part);
        }
    }

    #[test]
    fn test_first_video_url() {
        let mut pack = VideoFilePack::new();
        pack.put(file(PartIdentifier::SecondHalf, "second"));
        pack.put(file(PartIdentifier::FirstHalf, "first"));
        let source = VideoFileSource {
            video_file_packs: vec![pack],
            ..Default::default()
        };
        let url = source.first_video_url().unwrap();
        assert!(url.as_str().ends_with("first.mkv"));
        assert!(VideoFileSource::default().first_video_url().is_none());
    }
}
