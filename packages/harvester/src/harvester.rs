//! Paginated harvesting of remote feeds.
//!
//! A harvest walks a feed page by page until a stop condition is reached:
//!
//! 1. fetch the page and read its entries;
//! 2. zero entries stops the scan ([`StopReason::Exhausted`]);
//! 3. entries are accumulated;
//! 4. with a threshold set, the scan stops once the page's least recent
//!    entry is older than the threshold ([`StopReason::ThresholdReached`]);
//! 5. after the step budget is spent the scan stops
//!    ([`StopReason::StepLimit`]); a page without a next URL also ends it.
//!
//! None of these outcomes is an error. A failed fetch aborts the harvest
//! and is never retried here.

use std::fmt;

use chrono::{Local, NaiveDateTime};
use rayon::prelude::*;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{HarvestConfig, PAGE_PARAM};
use crate::error::{HarvesterError, Result};
use crate::feed::{parser_for, FeedEntry, FeedParser, SnapshotRequest};
use crate::http::Fetch;
use crate::kit::{DataSource, FeedKind, ListKit, PatternKitSet};
use crate::parse::{parse_list, parse_with_any, ListItem};
use crate::types::Event;

/// Why a scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A page yielded no (valid) entries.
    Exhausted,
    /// A page reached back past the date threshold.
    ThresholdReached,
    /// The step budget was spent.
    StepLimit,
    /// The last page had no next URL.
    EndOfFeed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Exhausted => "exhausted",
            Self::ThresholdReached => "threshold reached",
            Self::StepLimit => "step limit",
            Self::EndOfFeed => "end of feed",
        };
        f.write_str(reason)
    }
}

/// Anything with a publication time the threshold can be checked against.
pub trait Published {
    /// `None` counts as published now.
    fn published(&self) -> Option<NaiveDateTime>;
}

impl Published for FeedEntry {
    fn published(&self) -> Option<NaiveDateTime> {
        self.published
    }
}

impl Published for Event {
    fn published(&self) -> Option<NaiveDateTime> {
        Some(self.date)
    }
}

/// Entries read from one page and the URL of the following page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<E> {
    pub entries: Vec<E>,
    pub next: Option<Url>,
}

/// Everything accumulated by one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome<E> {
    pub entries: Vec<E>,
    pub stop: StopReason,
    pub fetches: usize,
}

/// Walk a paginated feed from `start`.
///
/// # Arguments
/// * `fetcher` - Fetch capability; its failures abort the scan
/// * `start` - First page URL
/// * `budget` - Maximum number of pages fetched
/// * `threshold` - Oldest publication time the caller is interested in
/// * `read_page` - Reads a fetched body into entries and the next URL
pub fn scan<E, F>(
    fetcher: &dyn Fetch,
    start: Url,
    budget: usize,
    threshold: Option<NaiveDateTime>,
    mut read_page: F,
) -> Result<ScanOutcome<E>>
where
    E: Published,
    F: FnMut(&Url, &str) -> Result<Page<E>>,
{
    let mut url = start;
    let mut entries = Vec::new();
    let mut fetches = 0;

    let stop = loop {
        let body = fetcher.fetch(&url)?;
        fetches += 1;

        let page = read_page(&url, &body)?;
        debug!(%url, entries = page.entries.len(), fetches, "Read page");
        if page.entries.is_empty() {
            break StopReason::Exhausted;
        }

        let least_recent = threshold.and_then(|_| {
            let now = Local::now().naive_local();
            page.entries
                .iter()
                .map(|e| e.published().unwrap_or(now))
                .min()
        });
        entries.extend(page.entries);

        if let (Some(threshold), Some(least_recent)) = (threshold, least_recent) {
            if least_recent < threshold {
                break StopReason::ThresholdReached;
            }
        }
        if fetches >= budget {
            break StopReason::StepLimit;
        }
        match page.next {
            Some(next) => url = next,
            None => break StopReason::EndOfFeed,
        }
    };

    Ok(ScanOutcome {
        entries,
        stop,
        fetches,
    })
}

/// URL of the next page of a page-numbered listing.
///
/// # Returns
/// `None` if the URL carries no `page` parameter (the listing is not
/// paginated). A non-numeric page counts as page 0.
#[must_use]
pub fn next_page_url(url: &Url) -> Option<Url> {
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let current = pairs
        .iter()
        .find(|(key, _)| key == PAGE_PARAM)
        .map(|(_, value)| value.parse::<u64>().unwrap_or(0))?;
    let next = current.checked_add(1)?.to_string();

    let mut next_url = url.clone();
    next_url
        .query_pairs_mut()
        .clear()
        .extend_pairs(pairs.iter().map(|(key, value)| {
            if key == PAGE_PARAM {
                (key.as_str(), next.as_str())
            } else {
                (key.as_str(), value.as_str())
            }
        }));
    Some(next_url)
}

/// Fill missing media containers from the extension of the first video URL.
pub fn correct_media_containers(event: &mut Event) {
    for source in &mut event.file_sources {
        if source.media_container.is_some() {
            continue;
        }
        let container = source
            .first_video_url()
            .and_then(file_extension)
            .map(|ext| ext.to_uppercase());
        source.media_container = container;
    }
}

fn file_extension(url: &Url) -> Option<&str> {
    let file = url.path_segments()?.next_back()?;
    let (_, ext) = file.rsplit_once('.')?;
    (!ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())).then_some(ext)
}

/// The result of one harvest pass.
///
/// Feed snapshots hold the raw documents and extract them lazily; each call
/// to [`Snapshot::events`] replays the extraction from the start.
pub struct Snapshot<'a> {
    kit_sets: &'a [PatternKitSet],
    items: SnapshotItems,
    pub stop: StopReason,
    pub fetches: usize,
}

enum SnapshotItems {
    Documents(Vec<FeedEntry>),
    Events(Vec<Event>),
}

impl<'a> Snapshot<'a> {
    fn from_documents(kit_sets: &'a [PatternKitSet], outcome: ScanOutcome<FeedEntry>) -> Self {
        Self {
            kit_sets,
            items: SnapshotItems::Documents(outcome.entries),
            stop: outcome.stop,
            fetches: outcome.fetches,
        }
    }

    fn from_events(kit_sets: &'a [PatternKitSet], outcome: ScanOutcome<Event>) -> Self {
        Self {
            kit_sets,
            items: SnapshotItems::Events(outcome.entries),
            stop: outcome.stop,
            fetches: outcome.fetches,
        }
    }

    /// Number of harvested items (documents or events).
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.items {
            SnapshotItems::Documents(docs) => docs.len(),
            SnapshotItems::Events(events) => events.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lazily extract one Event per harvested item, in harvest order.
    pub fn events(&self) -> Box<dyn Iterator<Item = Result<Event>> + '_> {
        match &self.items {
            SnapshotItems::Documents(docs) => Box::new(
                docs.iter()
                    .map(|doc| parse_with_any(self.kit_sets, &doc.content)),
            ),
            SnapshotItems::Events(events) => Box::new(events.iter().cloned().map(Ok)),
        }
    }

    /// Extract every item, skipping malformed ones.
    ///
    /// # Errors
    /// Only configuration errors; any other extraction failure skips its item.
    pub fn extract_all(&self) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        for (index, result) in self.events().enumerate() {
            match result {
                Ok(event) => events.push(event),
                Err(e) if e.is_configuration() => return Err(e),
                Err(e) => warn!(entry = index, error = %e, "Skipping malformed entry"),
            }
        }
        Ok(events)
    }
}

/// Predicate identifying Events the caller already has.
pub type KnownFilter<'a> = Box<dyn Fn(&Event) -> bool + Send + Sync + 'a>;

/// Harvests one data source through a fetch capability.
pub struct Harvester<'a> {
    source: &'a DataSource,
    fetcher: &'a dyn Fetch,
    config: HarvestConfig,
    known: Option<KnownFilter<'a>>,
}

impl<'a> Harvester<'a> {
    /// Create a harvester running with exactly `config`.
    ///
    /// Use [`DataSource::harvest_config`] to start from the source's own
    /// budgets and layer caller overrides on top of that.
    #[must_use]
    pub fn new(source: &'a DataSource, fetcher: &'a dyn Fetch, config: HarvestConfig) -> Self {
        Self {
            source,
            fetcher,
            config,
            known: None,
        }
    }

    /// Skip enrichment of list items the caller already has.
    #[must_use]
    pub fn with_known_filter(mut self, known: impl Fn(&Event) -> bool + Send + Sync + 'a) -> Self {
        self.known = Some(Box::new(known));
        self
    }

    #[must_use]
    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Harvest the data source from its base URI.
    ///
    /// The request's start date, when given, is the date threshold;
    /// otherwise the configured threshold applies.
    pub fn snapshot(&self, request: &SnapshotRequest) -> Result<Snapshot<'a>> {
        self.config.validate()?;
        let start = request.feed_url(&self.source.base_uri, self.source.feed)?;
        let threshold = request.start_date.or(self.config.threshold);
        info!(
            source = %self.source.name,
            url = %start,
            threshold = ?threshold,
            "Starting harvest"
        );

        let snapshot = match parser_for(self.source.feed) {
            Some(parser) => {
                let outcome = self.scan_feed(parser, start, self.config.max_scan_steps, threshold)?;
                Snapshot::from_documents(&self.source.kit_sets, outcome)
            }
            None => {
                let outcome = self.scan_forum(start, threshold)?;
                Snapshot::from_events(&self.source.kit_sets, outcome)
            }
        };

        info!(
            source = %self.source.name,
            items = snapshot.len(),
            fetches = snapshot.fetches,
            stop = %snapshot.stop,
            "Harvest finished"
        );
        Ok(snapshot)
    }

    /// Harvest a single page without following pagination.
    ///
    /// For link-following feeds the URL is read as one feed page; for forums
    /// it is read as one Event page.
    pub fn snapshot_url(&self, url: &Url) -> Result<Snapshot<'a>> {
        info!(source = %self.source.name, %url, "Reading single page");
        match parser_for(self.source.feed) {
            Some(parser) => {
                let outcome = self.scan_feed(parser, url.clone(), 1, None)?;
                Ok(Snapshot::from_documents(&self.source.kit_sets, outcome))
            }
            None => {
                let body = self.fetcher.fetch(url)?;
                let mut event = parse_with_any(&self.source.kit_sets, &body)?;
                correct_media_containers(&mut event);
                Ok(Snapshot::from_events(
                    &self.source.kit_sets,
                    ScanOutcome {
                        entries: vec![event],
                        stop: StopReason::StepLimit,
                        fetches: 1,
                    },
                ))
            }
        }
    }

    fn scan_feed(
        &self,
        parser: &dyn FeedParser,
        start: Url,
        budget: usize,
        threshold: Option<NaiveDateTime>,
    ) -> Result<ScanOutcome<FeedEntry>> {
        scan(self.fetcher, start, budget, threshold, |url, body| {
            let page = parser.parse_page(body, url)?;
            Ok(Page {
                entries: page.entries,
                next: page.next,
            })
        })
    }

    fn scan_forum(
        &self,
        start: Url,
        threshold: Option<NaiveDateTime>,
    ) -> Result<ScanOutcome<Event>> {
        let list = self.source.list.as_ref().ok_or_else(|| {
            HarvesterError::Configuration(format!("{} has no list kit", self.source.name))
        })?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
            .map_err(|e| HarvesterError::Configuration(format!("worker pool: {e}")))?;

        scan(
            self.fetcher,
            start,
            self.config.scrape_steps,
            threshold,
            |url, body| {
                let items = self.new_list_items(body, list, url)?;
                let enriched = pool.install(|| {
                    items
                        .into_par_iter()
                        .map(|item| self.enrich(item))
                        .collect::<Result<Vec<_>>>()
                })?;
                Ok(Page {
                    entries: enriched.into_iter().flatten().collect(),
                    next: next_page_url(url),
                })
            },
        )
    }

    /// Valid list items the caller does not already have.
    fn new_list_items(&self, body: &str, list: &ListKit, url: &Url) -> Result<Vec<ListItem>> {
        let items = parse_list(body, list, url)?;
        let total = items.len();

        let valid: Vec<_> = items
            .into_iter()
            .filter(|item| item.event.is_resolved())
            .collect();
        if valid.len() < total {
            debug!(%url, skipped = total - valid.len(), "Skipped unresolved list items");
        }

        Ok(match &self.known {
            Some(known) => valid.into_iter().filter(|item| !known(&item.event)).collect(),
            None => valid,
        })
    }

    /// Follow a list item's link and merge the file sources found there.
    ///
    /// # Returns
    /// `Ok(None)` when the item has to be omitted; only configuration
    /// errors are propagated.
    fn enrich(&self, item: ListItem) -> Result<Option<Event>> {
        let detail = self
            .fetcher
            .fetch(&item.link)
            .and_then(|body| parse_with_any(&self.source.kit_sets, &body));

        match detail {
            Ok(detail) => {
                let mut event = item.event;
                event.add_file_sources(detail.file_sources);
                correct_media_containers(&mut event);
                Ok(Some(event))
            }
            Err(e) if e.is_configuration() => Err(e),
            Err(e) => {
                warn!(link = %item.link, error = %e, "Omitting list item");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves canned bodies and counts fetches.
    struct FakeFetcher {
        pages: HashMap<String, String>,
        fetches: AtomicUsize,
    }

    impl FakeFetcher {
        fn new(pages: impl IntoIterator<Item = (String, String)>) -> Self {
            Self {
                pages: pages.into_iter().collect(),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    impl Fetch for FakeFetcher {
        fn fetch(&self, url: &Url) -> Result<String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| HarvesterError::HttpStatus {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Dated(NaiveDateTime);

    impl Published for Dated {
        fn published(&self) -> Option<NaiveDateTime> {
            Some(self.0)
        }
    }

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 12, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn page_url(n: usize) -> Url {
        Url::parse(&format!("https://feed.example.com/page/{n}")).unwrap()
    }

    /// Pages 1..=count, two entries each, newest first: page n holds days
    /// 31-2n+2 and 31-2n+1. Bodies are the page number.
    fn feed(count: usize) -> FakeFetcher {
        FakeFetcher::new((1..=count).map(|n| (page_url(n).to_string(), n.to_string())))
    }

    fn read_dated(count: usize) -> impl FnMut(&Url, &str) -> Result<Page<Dated>> {
        move |_, body| {
            let n: usize = body.parse().unwrap_or(0);
            let newest = 31 - 2 * (n as u32 - 1);
            Ok(Page {
                entries: vec![Dated(day(newest)), Dated(day(newest - 1))],
                next: (n < count).then(|| page_url(n + 1)),
            })
        }
    }

    #[test]
    fn test_threshold_on_page_k_stops_after_k_fetches() {
        let fetcher = feed(5);
        // Page 3 holds days 27 and 26.
        let outcome = scan(&fetcher, page_url(1), 50, Some(day(27)), read_dated(5)).unwrap();

        assert_eq!(outcome.fetches, 3);
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.stop, StopReason::ThresholdReached);
        assert_eq!(outcome.entries.len(), 6);
    }

    #[test]
    fn test_budget_limits_fetches_without_threshold() {
        let fetcher = feed(5);
        let outcome = scan(&fetcher, page_url(1), 3, None, read_dated(5)).unwrap();

        assert_eq!(outcome.fetches, 3);
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.stop, StopReason::StepLimit);
        assert_eq!(outcome.entries.len(), 6);
    }

    #[test]
    fn test_end_of_feed() {
        let fetcher = feed(2);
        let outcome = scan(&fetcher, page_url(1), 50, None, read_dated(2)).unwrap();
        assert_eq!(outcome.stop, StopReason::EndOfFeed);
        assert_eq!(outcome.fetches, 2);
    }

    #[test]
    fn test_empty_page_exhausts() {
        let fetcher = feed(3);
        let outcome = scan(&fetcher, page_url(1), 50, None, |_, body| {
            Ok(Page::<Dated> {
                entries: if body == "1" { vec![Dated(day(1))] } else { Vec::new() },
                next: Some(page_url(body.parse::<usize>().unwrap_or(0) + 1)),
            })
        })
        .unwrap();
        assert_eq!(outcome.stop, StopReason::Exhausted);
        assert_eq!(outcome.fetches, 2);
        assert_eq!(outcome.entries.len(), 1);
    }

    #[test]
    fn test_fetch_failure_is_fatal() {
        let fetcher = feed(1);
        let err = scan(&fetcher, page_url(1), 50, None, |_, _| {
            Ok(Page {
                entries: vec![Dated(day(1))],
                next: Some(page_url(9)),
            })
        })
        .unwrap_err();
        assert!(matches!(err, HarvesterError::HttpStatus { status: 404, .. }));
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_next_page_url_increments() {
        let url = Url::parse("https://forum.example.com/viewforum.php?f=7&page=2").unwrap();
        assert_eq!(
            next_page_url(&url).unwrap().as_str(),
            "https://forum.example.com/viewforum.php?f=7&page=3"
        );

        let url = Url::parse("https://forum.example.com/viewforum.php?page=abc&f=7").unwrap();
        assert_eq!(
            next_page_url(&url).unwrap().as_str(),
            "https://forum.example.com/viewforum.php?page=1&f=7"
        );
    }

    #[test]
    fn test_next_page_url_last_representable_page() {
        let url = Url::parse("https://forum.example.com/viewforum.php?f=7&page=18446744073709551615")
            .unwrap();
        assert!(next_page_url(&url).is_none());
    }

    #[test]
    fn test_next_page_url_absent() {
        let url = Url::parse("https://forum.example.com/viewforum.php?f=7").unwrap();
        assert!(next_page_url(&url).is_none());
    }

    #[test]
    fn test_file_extension() {
        let url = Url::parse("https://files.example.com/a/match.part1.mkv?dl=1").unwrap();
        assert_eq!(file_extension(&url), Some("mkv"));
        let url = Url::parse("https://files.example.com/download").unwrap();
        assert_eq!(file_extension(&url), None);
    }

    #[test]
    fn test_stop_reason_display() {
        assert_eq!(StopReason::ThresholdReached.to_string(), "threshold reached");
    }

    const FORUM_SOURCE: &str = r#"
name: Test forum
base_uri: https://forum.example.com/viewforum.php?f=7&page=1
feed: forum
scrape_steps: 3
workers: 2
kit_sets:
  - event:
      pattern: '\[(.+?)\] (\w+) vs (\w+) - (\d{2}/\d{2}/\d{4})'
      fields:
        1: competition
        2: home_team
        3: away_team
        4: date
    file_sources:
      - pattern: 'Channel: (\w+)'
        fields:
          1: channel
        video_url: '^https://files\.example\.com/'
list:
  link_selector: 'a.topictitle'
  event:
    pattern: '\[(.+?)\] (\w+) vs (\w+) - (\d{2}/\d{2}/\d{4})'
    fields:
      1: competition
      2: home_team
      3: away_team
      4: date
"#;

    const LISTING: &str = r#"
        <ul>
          <li><a class="topictitle" href="viewtopic.php?t=1">[Premier League] Arsenal vs Chelsea - 02/12/2023</a></li>
          <li><a class="topictitle" href="viewtopic.php?t=2">[Serie A] Inter vs Milan - 03/12/2023</a></li>
          <li><a class="topictitle" href="viewtopic.php?t=3">Site rules</a></li>
        </ul>"#;

    const DETAIL: &str = r#"
        <div><p>[Premier League] Arsenal vs Chelsea - 02/12/2023</p><p>Channel: Sky</p><p>1st half</p><a href="https://files.example.com/ars-che-1.mkv">Part 1</a></div>"#;

    fn forum_pages() -> FakeFetcher {
        FakeFetcher::new([
            (
                "https://forum.example.com/viewforum.php?f=7&page=1".to_string(),
                LISTING.to_string(),
            ),
            (
                "https://forum.example.com/viewforum.php?f=7&page=2".to_string(),
                "<ul></ul>".to_string(),
            ),
            (
                "https://forum.example.com/viewtopic.php?t=1".to_string(),
                DETAIL.to_string(),
            ),
        ])
    }

    #[test]
    fn test_forum_snapshot_enriches_and_omits_failures() {
        let source = DataSource::from_yaml(FORUM_SOURCE).unwrap();
        let fetcher = forum_pages();
        let config = source.harvest_config(HarvestConfig::default());
        let harvester = Harvester::new(&source, &fetcher, config);
        assert_eq!(harvester.config().scrape_steps, 3);
        assert_eq!(harvester.config().workers, 2);

        let snapshot = harvester.snapshot(&SnapshotRequest::default()).unwrap();
        assert_eq!(snapshot.stop, StopReason::Exhausted);
        assert_eq!(snapshot.fetches, 2);
        // Two listing pages plus both detail pages, one of which is missing.
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 4);

        let events = snapshot.extract_all().unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.title(), "Arsenal vs Chelsea");
        assert_eq!(event.file_sources.len(), 1);

        let source = &event.file_sources[0];
        assert_eq!(source.channel.as_deref(), Some("Sky"));
        assert_eq!(source.media_container.as_deref(), Some("MKV"));
        let pack = &source.video_file_packs[0];
        assert!(pack.get(crate::types::PartIdentifier::FirstHalf).is_some());
    }

    #[test]
    fn test_given_config_wins_over_source_budgets() {
        let source = DataSource::from_yaml(FORUM_SOURCE).unwrap();
        let fetcher = forum_pages();
        let config = source.harvest_config(HarvestConfig::default()).with_steps(1);
        let harvester = Harvester::new(&source, &fetcher, config);
        assert_eq!(harvester.config().scrape_steps, 1);
        assert_eq!(harvester.config().max_scan_steps, 1);

        let snapshot = harvester.snapshot(&SnapshotRequest::default()).unwrap();
        assert_eq!(snapshot.stop, StopReason::StepLimit);
        assert_eq!(snapshot.fetches, 1);
        assert_eq!(snapshot.len(), 1);
        // One listing page plus its two detail pages.
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 3);
    }

    /// List kit whose competition and date groups are optional.
    fn loose_list_source() -> DataSource {
        let (kits, _) = FORUM_SOURCE.split_once("list:\n").unwrap();
        let yaml = format!(
            "{kits}list:\n  link_selector: 'a.topictitle'\n  event:\n    pattern: '(?:\\[(.+?)\\] )?(\\w+) vs (\\w+)(?: - (\\d{{2}}/\\d{{2}}/\\d{{4}}))?'\n    fields:\n      1: competition\n      2: home_team\n      3: away_team\n      4: date\n"
        );
        DataSource::from_yaml(&yaml).unwrap()
    }

    const UNRESOLVED_LISTING: &str = r#"
        <ul>
          <li><a class="topictitle" href="viewtopic.php?t=4">Spurs vs Fulham - 02/12/2023</a></li>
          <li><a class="topictitle" href="viewtopic.php?t=5">[Premier League] Wolves vs Burnley</a></li>
        </ul>"#;

    #[test]
    fn test_unresolved_list_items_are_not_enriched() {
        let source = loose_list_source();
        let listing = format!("{LISTING}{UNRESOLVED_LISTING}");
        let fetcher = FakeFetcher::new([
            (
                "https://forum.example.com/viewforum.php?f=7&page=1".to_string(),
                listing,
            ),
            (
                "https://forum.example.com/viewforum.php?f=7&page=2".to_string(),
                UNRESOLVED_LISTING.to_string(),
            ),
            (
                "https://forum.example.com/viewtopic.php?t=1".to_string(),
                DETAIL.to_string(),
            ),
        ]);
        let harvester = Harvester::new(&source, &fetcher, HarvestConfig::default());

        let snapshot = harvester.snapshot(&SnapshotRequest::default()).unwrap();
        // The second page only holds items without a competition or a date.
        assert_eq!(snapshot.stop, StopReason::Exhausted);
        assert_eq!(snapshot.fetches, 2);
        // Two listing pages and the detail pages of t=1 and t=2 only.
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 4);

        let events = snapshot.extract_all().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title(), "Arsenal vs Chelsea");
    }

    #[test]
    fn test_all_unresolved_page_exhausts_without_detail_fetches() {
        let source = loose_list_source();
        let fetcher = FakeFetcher::new([(
            "https://forum.example.com/viewforum.php?f=7&page=1".to_string(),
            UNRESOLVED_LISTING.to_string(),
        )]);
        let harvester = Harvester::new(&source, &fetcher, HarvestConfig::default());

        let snapshot = harvester.snapshot(&SnapshotRequest::default()).unwrap();
        assert_eq!(snapshot.stop, StopReason::Exhausted);
        assert_eq!(snapshot.fetches, 1);
        assert!(snapshot.is_empty());
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_known_events_are_not_enriched() {
        let source = DataSource::from_yaml(FORUM_SOURCE).unwrap();
        let fetcher = forum_pages();
        let harvester = Harvester::new(&source, &fetcher, HarvestConfig::default())
            .with_known_filter(|event| event.home_team.as_ref().is_some_and(|t| t.name == "Arsenal"));

        let snapshot = harvester.snapshot(&SnapshotRequest::default()).unwrap();
        // Only the failing item was new, so the first page counts as empty.
        assert_eq!(snapshot.stop, StopReason::Exhausted);
        assert_eq!(snapshot.fetches, 1);
        assert!(snapshot.is_empty());
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_forum_snapshot_url_reads_one_detail_page() {
        let source = DataSource::from_yaml(FORUM_SOURCE).unwrap();
        let fetcher = forum_pages();
        let harvester = Harvester::new(&source, &fetcher, HarvestConfig::default());

        let url = Url::parse("https://forum.example.com/viewtopic.php?t=1").unwrap();
        let snapshot = harvester.snapshot_url(&url).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_blog_snapshot_skips_malformed_entries() {
        let yaml = FORUM_SOURCE
            .replace("feed: forum", "feed: blogger_html")
            .replace(
                "https://forum.example.com/viewforum.php?f=7&page=1",
                "https://matchday.blogspot.com/",
            );
        let source = DataSource::from_yaml(&yaml).unwrap();
        let page = format!(
            r#"<div class="post-outer"><abbr class="published" title="2023-12-02T20:00:00Z">Sat</abbr><div class="entry-content">{DETAIL}</div></div>
               <div class="post-outer"><abbr class="published" title="2023-12-01T20:00:00Z">Fri</abbr><div class="entry-content"><div><p>Site news</p></div></div></div>"#
        );
        let fetcher = FakeFetcher::new([("https://matchday.blogspot.com/search".to_string(), page)]);
        let harvester = Harvester::new(&source, &fetcher, HarvestConfig::default());

        let snapshot = harvester.snapshot(&SnapshotRequest::default()).unwrap();
        assert_eq!(snapshot.stop, StopReason::EndOfFeed);
        assert_eq!(snapshot.len(), 2);

        let results: Vec<_> = snapshot.events().collect();
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(HarvesterError::UnparsableDocument { .. })
        ));
        // Extraction can be replayed.
        assert_eq!(snapshot.extract_all().unwrap().len(), 1);
        assert_eq!(snapshot.events().count(), 2);
    }

    #[test]
    fn test_correct_media_containers_keeps_captured_value() {
        let mut event = Event {
            competition: None,
            home_team: None,
            away_team: None,
            season: crate::types::Season::current(),
            fixture: crate::types::Fixture::default(),
            date: day(1),
            file_sources: vec![crate::types::VideoFileSource {
                media_container: Some("TS".to_string()),
                ..Default::default()
            }],
            warnings: Vec::new(),
        };
        correct_media_containers(&mut event);
        assert_eq!(event.file_sources[0].media_container.as_deref(), Some("TS"));
    }
}
