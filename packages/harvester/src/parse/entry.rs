//! Extraction of Event graphs from one document.

use std::sync::LazyLock;

use chrono::{Local, NaiveTime};
use scraper::node::Node;
use scraper::{ElementRef, Selector};
use tracing::debug;
use url::Url;

use super::text::Document;
use crate::config::EXCERPT_LEN;
use crate::error::{HarvesterError, Result};
use crate::kit::{
    EventMetadataPatternKit, FieldName, FileSourceMetadataPatternKit, PatternKitSet, Record,
};
use crate::types::{
    Event, ExtractionWarning, Fixture, PartIdentifier, Resolution, Season, VideoFile,
    VideoFilePack, VideoFileSource,
};

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Extracts an [`Event`] with its file sources from documents, using one
/// [`PatternKitSet`].
///
/// Extraction is pure: the same document always yields the same graph
/// (apart from defaults taken from the current date).
pub struct EntryParser<'k> {
    kits: &'k PatternKitSet,
}

impl<'k> EntryParser<'k> {
    #[must_use]
    pub fn new(kits: &'k PatternKitSet) -> Self {
        Self { kits }
    }

    /// Parse and extract one document.
    pub fn parse(&self, html: &str) -> Result<Event> {
        self.extract(&Document::parse(html))
    }

    /// Extract one Event from an already parsed document.
    ///
    /// # Errors
    /// * `UnparsableDocument` if the Event-metadata pattern has no match
    /// * `CorrelationMismatch` if a file-source kit finds a different number
    ///   of metadata blocks than video file packs
    pub fn extract(&self, document: &Document) -> Result<Event> {
        let text = document.text();
        let mut event = parse_event(&self.kits.event, text)?;

        for kit in &self.kits.file_sources {
            let mut warnings = Vec::new();
            let sources = kit
                .kit()
                .records(text)
                .map(|record| build_file_source(&record, &mut warnings))
                .collect::<Result<Vec<_>>>()?;
            let packs = scan_video_links(document, kit);
            let sources = correlate(packs, sources)?;

            event.add_file_sources(sources);
            event.warnings.extend(warnings);
        }

        Ok(event)
    }
}

/// Extract with each kit set in turn; the first success wins.
///
/// Data errors of one set are logged and the next set is tried. A
/// configuration error aborts immediately.
///
/// # Returns
/// The first extracted Event, or the last set's error if every set fails.
pub fn parse_with_any(kit_sets: &[PatternKitSet], html: &str) -> Result<Event> {
    let document = Document::parse(html);
    let mut last_error = None;

    for (index, kits) in kit_sets.iter().enumerate() {
        match EntryParser::new(kits).extract(&document) {
            Ok(event) => return Ok(event),
            Err(e) if e.is_configuration() => return Err(e),
            Err(e) => {
                debug!(kit_set = index, error = %e, "Kit set could not parse document");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        HarvesterError::Configuration("no pattern kit sets configured".to_string())
    }))
}

/// Apply the Event-metadata kit once (first match only).
fn parse_event(kit: &EventMetadataPatternKit, text: &str) -> Result<Event> {
    let record = kit
        .kit()
        .first(text)
        .ok_or_else(|| HarvesterError::UnparsableDocument {
            pattern: kit.kit().pattern().to_string(),
            excerpt: excerpt(text),
        })?;
    build_event(&record)
}

/// Build an Event from bound metadata, substituting documented defaults.
///
/// Every substitution is logged and recorded as an [`ExtractionWarning`].
pub fn build_event(record: &Record) -> Result<Event> {
    let mut warnings = Vec::new();

    let date = match record.date(FieldName::Date)? {
        Some(date) => date,
        None => {
            warnings.push(record.default_warning(FieldName::Date));
            Local::now().date_naive().and_time(NaiveTime::MIN)
        }
    };
    let season = match record.season(FieldName::Season)? {
        Some(season) => season,
        None => {
            warnings.push(record.default_warning(FieldName::Season));
            Season::current()
        }
    };
    let fixture = match record.fixture(FieldName::Fixture)? {
        Some(fixture) => fixture,
        None => {
            warnings.push(record.default_warning(FieldName::Fixture));
            Fixture::default()
        }
    };

    for warning in &warnings {
        debug!(%warning, "Default substituted in Event metadata");
    }

    Ok(Event {
        competition: record.competition(FieldName::Competition)?,
        home_team: record.team(FieldName::HomeTeam)?,
        away_team: record.team(FieldName::AwayTeam)?,
        season,
        fixture,
        date,
        file_sources: Vec::new(),
        warnings,
    })
}

fn build_file_source(
    record: &Record,
    warnings: &mut Vec<ExtractionWarning>,
) -> Result<VideoFileSource> {
    let resolution = match record.resolution(FieldName::Resolution)? {
        Some(resolution) => resolution,
        None => {
            let warning = record.default_warning(FieldName::Resolution);
            debug!(%warning, "Default substituted in file source metadata");
            warnings.push(warning);
            Resolution::default()
        }
    };

    let integer = |field: FieldName| -> Result<u64> {
        if let Some(raw) = record.unparsable(field) {
            debug!(%field, raw, "Unparsable number, using 0");
        }
        Ok(record.integer(field)?.unwrap_or(0))
    };

    Ok(VideoFileSource {
        channel: record.text(FieldName::Channel)?,
        source: record.text(FieldName::Source)?,
        approximate_duration: record.text(FieldName::ApproximateDuration)?,
        languages: record.text(FieldName::Languages)?,
        media_container: record.text(FieldName::MediaContainer)?,
        video_codec: record.text(FieldName::VideoCodec)?,
        audio_codec: record.text(FieldName::AudioCodec)?,
        resolution,
        audio_channels: record.channels(FieldName::AudioChannels)?.unwrap_or(0),
        video_bitrate: integer(FieldName::VideoBitrate)?,
        audio_bitrate: integer(FieldName::AudioBitrate)?,
        filesize: integer(FieldName::Filesize)?,
        framerate: u32::try_from(integer(FieldName::Framerate)?).unwrap_or(0),
        video_file_packs: Vec::new(),
    })
}

/// Collect the document's video links into packs, in document order.
fn scan_video_links(document: &Document, kit: &FileSourceMetadataPatternKit) -> Vec<VideoFilePack> {
    let mut packs = Vec::new();

    for anchor in document.html().select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !kit.is_video_link(href) {
            continue;
        }
        let url = match Url::parse(href) {
            Ok(url) => url,
            Err(e) => {
                debug!(href, error = %e, "Skipping video link with unusable URL");
                continue;
            }
        };
        let part = find_part_identifier(anchor, kit);
        put_in_pack(&mut packs, VideoFile::new(part, url));
    }

    packs
}

/// Nearest preceding sibling (text or element) naming a part, else `Default`.
fn find_part_identifier(
    anchor: ElementRef<'_>,
    kit: &FileSourceMetadataPatternKit,
) -> PartIdentifier {
    anchor
        .prev_siblings()
        .filter_map(|sibling| match sibling.value() {
            Node::Text(text) => {
                let text: &str = text;
                Some(text.to_string())
            }
            Node::Element(_) => ElementRef::wrap(sibling).map(|el| el.text().collect()),
            _ => None,
        })
        .find_map(|text| kit.part_identifier(&text))
        .unwrap_or(PartIdentifier::Default)
}

/// Greedy first-fit: the first pack without this part takes the file,
/// otherwise a new pack is started.
pub fn put_in_pack(packs: &mut Vec<VideoFilePack>, file: VideoFile) {
    if let Some(pack) = packs.iter_mut().find(|p| p.accepts(file.title)) {
        pack.put(file);
        return;
    }
    let mut pack = VideoFilePack::new();
    pack.put(file);
    packs.push(pack);
}

/// Assign the i-th pack to the i-th source.
///
/// # Errors
/// `CorrelationMismatch` when the counts differ; nothing is assigned.
pub fn correlate(
    packs: Vec<VideoFilePack>,
    mut sources: Vec<VideoFileSource>,
) -> Result<Vec<VideoFileSource>> {
    if packs.len() != sources.len() {
        debug!(
            packs = packs.len(),
            sources = sources.len(),
            "Video file packs do not line up with file sources"
        );
        return Err(HarvesterError::CorrelationMismatch {
            packs: packs.len(),
            sources: sources.len(),
        });
    }

    for (source, pack) in sources.iter_mut().zip(packs) {
        source.video_file_packs.push(pack);
    }
    Ok(sources)
}

fn excerpt(text: &str) -> String {
    if text.chars().count() < EXCERPT_LEN {
        return text.to_string();
    }
    let truncated: String = text
        .chars()
        .filter(|c| *c != '_')
        .take(EXCERPT_LEN)
        .collect();
    format!("{truncated}...")
}
