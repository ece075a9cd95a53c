//! Data sources: pattern kits and feed settings authored as YAML.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use scraper::Selector;
use serde::Deserialize;
use url::Url;

use super::core::{EventMetadataPatternKit, FileSourceMetadataPatternKit, PatternKitSet};
use super::types::FieldName;
use crate::config::HarvestConfig;
use crate::error::{HarvesterError, Result};

/// How a data source's feed is paginated and read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// Blogger HTML pages, following the "older posts" link.
    BloggerHtml,
    /// Blogger JSON feed, following the `next` link.
    BloggerJson,
    /// Forum listing pages, incrementing the `page` query parameter.
    Forum,
}

impl FeedKind {
    /// Whether pages are advanced by following a link in the page.
    #[must_use]
    pub fn follows_links(&self) -> bool {
        matches!(self, Self::BloggerHtml | Self::BloggerJson)
    }
}

/// Pattern kit applied to the anchors of a forum listing page.
#[derive(Debug, Clone)]
pub struct ListKit {
    /// Anchors whose text describes one Event and whose `href` is its detail page.
    pub link_selector: Selector,
    pub event: EventMetadataPatternKit,
}

/// A configured data source with its compiled, read-only pattern kits.
#[derive(Debug, Clone)]
pub struct DataSource {
    pub name: String,
    pub base_uri: Url,
    pub feed: FeedKind,
    pub kit_sets: Vec<PatternKitSet>,
    pub list: Option<ListKit>,
    pub max_scan_steps: Option<usize>,
    pub scrape_steps: Option<usize>,
    pub workers: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDataSource {
    #[serde(default)]
    name: Option<String>,
    base_uri: String,
    feed: FeedKind,
    kit_sets: Vec<RawKitSet>,
    #[serde(default)]
    list: Option<RawListKit>,
    #[serde(default)]
    max_scan_steps: Option<usize>,
    #[serde(default)]
    scrape_steps: Option<usize>,
    #[serde(default)]
    workers: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawKitSet {
    event: RawKit,
    #[serde(default)]
    file_sources: Vec<RawFileSourceKit>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawKit {
    pattern: String,
    #[serde(default)]
    fields: BTreeMap<usize, FieldName>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFileSourceKit {
    pattern: String,
    #[serde(default)]
    fields: BTreeMap<usize, FieldName>,
    video_url: String,
    #[serde(default)]
    part_identifier: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawListKit {
    link_selector: String,
    event: RawKit,
}

impl DataSource {
    /// Load a data source from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Parse and compile a data source from YAML.
    ///
    /// # Errors
    /// Malformed YAML yields a YAML error; every rule that fails to compile
    /// yields a configuration error.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let raw: RawDataSource = serde_yaml_ng::from_str(yaml)?;
        Self::compile(raw)
    }

    fn compile(raw: RawDataSource) -> Result<Self> {
        let base_uri = Url::parse(&raw.base_uri)
            .map_err(|e| HarvesterError::Configuration(format!("base_uri '{}': {e}", raw.base_uri)))?;

        if raw.kit_sets.is_empty() {
            return Err(HarvesterError::Configuration(
                "a data source needs at least one kit set".to_string(),
            ));
        }

        let kit_sets = raw
            .kit_sets
            .into_iter()
            .map(compile_kit_set)
            .collect::<Result<Vec<_>>>()?;

        let list = raw.list.map(compile_list_kit).transpose()?;
        if raw.feed == FeedKind::Forum && list.is_none() {
            return Err(HarvesterError::Configuration(
                "forum data sources need a 'list' kit".to_string(),
            ));
        }

        for (name, value) in [
            ("max_scan_steps", raw.max_scan_steps),
            ("scrape_steps", raw.scrape_steps),
            ("workers", raw.workers),
        ] {
            if value == Some(0) {
                return Err(HarvesterError::Configuration(format!(
                    "{name} must be at least 1"
                )));
            }
        }

        Ok(Self {
            name: raw
                .name
                .unwrap_or_else(|| base_uri.host_str().unwrap_or("data source").to_string()),
            base_uri,
            feed: raw.feed,
            kit_sets,
            list,
            max_scan_steps: raw.max_scan_steps,
            scrape_steps: raw.scrape_steps,
            workers: raw.workers,
        })
    }

    /// Apply this source's overrides on top of `base`.
    #[must_use]
    pub fn harvest_config(&self, base: HarvestConfig) -> HarvestConfig {
        HarvestConfig {
            max_scan_steps: self.max_scan_steps.unwrap_or(base.max_scan_steps),
            scrape_steps: self.scrape_steps.unwrap_or(base.scrape_steps),
            workers: self.workers.unwrap_or(base.workers),
            threshold: base.threshold,
        }
    }

    /// Total number of compiled pattern kits.
    #[must_use]
    pub fn kit_count(&self) -> usize {
        let sets: usize = self.kit_sets.iter().map(|s| 1 + s.file_sources.len()).sum();
        sets + usize::from(self.list.is_some())
    }
}

fn compile_kit_set(raw: RawKitSet) -> Result<PatternKitSet> {
    let event = EventMetadataPatternKit::new(&raw.event.pattern, raw.event.fields)?;
    let file_sources = raw
        .file_sources
        .into_iter()
        .map(|fs| {
            FileSourceMetadataPatternKit::new(
                &fs.pattern,
                fs.fields,
                &fs.video_url,
                fs.part_identifier.as_deref(),
            )
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PatternKitSet {
        event,
        file_sources,
    })
}

fn compile_list_kit(raw: RawListKit) -> Result<ListKit> {
    let link_selector = Selector::parse(&raw.link_selector).map_err(|e| {
        HarvesterError::Configuration(format!("link_selector '{}': {e:?}", raw.link_selector))
    })?;
    let event = EventMetadataPatternKit::new(&raw.event.pattern, raw.event.fields)?;
    Ok(ListKit {
        link_selector,
        event,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOG_SOURCE: &str = r#"
name: Test blog
base_uri: https://matchday.blogspot.com/
feed: blogger_html
max_scan_steps: 5
kit_sets:
  - event:
      pattern: '(\w[\w ]*) vs (\w[\w ]*) (\d{2}/\d{2})'
      fields:
        1: home_team
        2: away_team
        3: season
    file_sources:
      - pattern: 'Channel: ([^\n]+?) Resolution: (\w+)'
        fields:
          1: channel
          2: resolution
        video_url: '^https://files\.example\.com/'
"#;

    #[test]
    fn test_load_blog_source() {
        let source = DataSource::from_yaml(BLOG_SOURCE).unwrap();
        assert_eq!(source.name, "Test blog");
        assert_eq!(source.feed, FeedKind::BloggerHtml);
        assert!(source.feed.follows_links());
        assert_eq!(source.kit_sets.len(), 1);
        assert_eq!(source.kit_sets[0].event.season(), Some(3));
        assert_eq!(source.kit_sets[0].file_sources.len(), 1);
        assert_eq!(source.kit_count(), 2);
    }

    #[test]
    fn test_harvest_config_overrides() {
        let source = DataSource::from_yaml(BLOG_SOURCE).unwrap();
        let config = source.harvest_config(HarvestConfig::default());
        assert_eq!(config.max_scan_steps, 5);
        assert_eq!(config.scrape_steps, crate::config::DEFAULT_SCRAPE_STEPS);
    }

    #[test]
    fn test_bad_group_index_fails_at_load() {
        let yaml = BLOG_SOURCE.replace("3: season", "4: season");
        let err = DataSource::from_yaml(&yaml).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_forum_requires_list_kit() {
        let yaml = BLOG_SOURCE.replace("blogger_html", "forum");
        let err = DataSource::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("'list' kit"));
    }

    #[test]
    fn test_forum_source_with_list_kit() {
        let yaml = format!(
            "{}list:\n  link_selector: 'a.topictitle'\n  event:\n    pattern: '(\\w+) vs (\\w+)'\n    fields:\n      1: home_team\n      2: away_team\n",
            BLOG_SOURCE.replace("blogger_html", "forum")
        );
        let source = DataSource::from_yaml(&yaml).unwrap();
        assert!(!source.feed.follows_links());
        assert!(source.list.is_some());
    }

    #[test]
    fn test_unknown_field_name_rejected() {
        let yaml = BLOG_SOURCE.replace("1: channel", "1: bogus");
        assert!(DataSource::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_zero_budget_rejected() {
        let yaml = BLOG_SOURCE.replace("max_scan_steps: 5", "max_scan_steps: 0");
        assert!(DataSource::from_yaml(&yaml).unwrap_err().is_configuration());
    }
}
