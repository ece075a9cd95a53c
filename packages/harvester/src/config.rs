//! Configuration constants and validation functions for the harvester.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{HarvesterError, Result};

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Default number of pages a link-following feed may be walked.
pub const DEFAULT_MAX_SCAN_STEPS: usize = 50;

/// Default number of pages a page-parameter feed may be walked.
pub const DEFAULT_SCRAPE_STEPS: usize = 10;

/// Default size of the enrichment worker pool.
pub const DEFAULT_WORKERS: usize = 4;

/// Date format of the `date` capture group in Event metadata.
pub const EVENT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Date-time format used in feed query parameters.
pub const FEED_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Maximum number of document characters quoted in an unparsable-document error.
pub const EXCERPT_LEN: usize = 128;

/// Query parameter carrying the page number of forum listings.
pub const PAGE_PARAM: &str = "page";

/// Date pattern: YYYY-MM-DD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Settings for one harvest call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestConfig {
    /// Page budget of link-following feeds.
    pub max_scan_steps: usize,

    /// Page budget of page-parameter feeds.
    pub scrape_steps: usize,

    /// Number of threads enriching forum list items.
    pub workers: usize,

    /// Stop once a page's least recent entry is older than this.
    pub threshold: Option<NaiveDateTime>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            max_scan_steps: DEFAULT_MAX_SCAN_STEPS,
            scrape_steps: DEFAULT_SCRAPE_STEPS,
            workers: DEFAULT_WORKERS,
            threshold: None,
        }
    }
}

impl HarvestConfig {
    /// Set the date threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: Option<NaiveDateTime>) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set both step budgets.
    #[must_use]
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.max_scan_steps = steps;
        self.scrape_steps = steps;
        self
    }

    /// Check that budgets and pool size are usable.
    pub fn validate(&self) -> Result<()> {
        validate_steps("max_scan_steps", self.max_scan_steps)?;
        validate_steps("scrape_steps", self.scrape_steps)?;
        validate_steps("workers", self.workers)
    }
}

/// Validate a step budget or pool size (must be at least 1).
pub fn validate_steps(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(HarvesterError::Configuration(format!(
            "{name} must be at least 1"
        )));
    }
    Ok(())
}

/// Validate and parse a date (YYYY-MM-DD) into the start of that day.
///
/// # Examples
/// ```
/// use matchday_harvester::config::validate_date;
///
/// assert!(validate_date("2024-08-01").is_ok());
/// assert!(validate_date("invalid").is_err());
/// assert!(validate_date("2024-13-01").is_err()); // Invalid month
/// ```
pub fn validate_date(date_str: &str) -> Result<NaiveDateTime> {
    if !DATE_PATTERN.is_match(date_str) {
        return Err(HarvesterError::InvalidDate(date_str.to_string()));
    }

    let parsed = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| HarvesterError::InvalidDate(date_str.to_string()))?;

    Ok(parsed.and_time(chrono::NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_date_valid() {
        let parsed = validate_date("2024-08-01").unwrap();
        assert_eq!(parsed.to_string(), "2024-08-01 00:00:00");
        assert!(validate_date("2000-02-29").is_ok());
    }

    #[test]
    fn test_validate_date_invalid_format() {
        assert!(validate_date("").is_err());
        assert!(validate_date("2024/08/01").is_err());
        assert!(validate_date("01/12/2023").is_err());
        assert!(validate_date("2024-8-1").is_err());
    }

    #[test]
    fn test_validate_date_invalid_date() {
        assert!(validate_date("2024-13-01").is_err());
        assert!(validate_date("2023-02-29").is_err());
        assert!(validate_date("2024-00-01").is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = HarvestConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_scan_steps, DEFAULT_MAX_SCAN_STEPS);
        assert!(config.threshold.is_none());
    }

    #[test]
    fn test_zero_budget_rejected() {
        let config = HarvestConfig::default().with_steps(0);
        let err = config.validate().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("max_scan_steps"));
    }
}
