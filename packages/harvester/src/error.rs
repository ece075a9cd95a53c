//! Error types for the harvester.
//!
//! Uses the dual-error pattern: `HarvesterError` for library consumers
//! with detailed error context, and `#[from]` conversions for the foreign
//! errors raised by the crates underneath.

use thiserror::Error;

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// A pattern kit or data source is misauthored.
    ///
    /// Always fatal: it signals a broken rule, never bad input data.
    #[error("Invalid pattern kit configuration: {0}")]
    Configuration(String),

    /// The Event-metadata pattern did not match a document.
    #[error("Could not parse Event metadata with pattern:\n{pattern}\nfrom supplied text:\n{excerpt}")]
    UnparsableDocument { pattern: String, excerpt: String },

    /// Link scanning and metadata matching disagree on the number of variants.
    #[error("Found {packs} video file pack(s) but {sources} file source(s); refusing to correlate")]
    CorrelationMismatch { packs: usize, sources: usize },

    /// Transport failure while fetching a page.
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote server answered with a non-success status.
    #[error("Request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    /// All retry attempts of the fetch collaborator failed.
    #[error("Failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// A URL could not be parsed or rewritten.
    #[error("Invalid URL: '{0}'")]
    InvalidUrl(String),

    /// Invalid date format.
    #[error("Invalid date format: '{0}'. Expected YYYY-MM-DD (e.g., 2024-08-01)")]
    InvalidDate(String),

    /// A feed page did not have the expected structure.
    #[error("Invalid feed: {0}")]
    InvalidFeed(String),

    /// HTTP client failure outside of a fetch (e.g. client construction).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization error.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON feed parsing error.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Regular expression compilation error.
    #[error("Invalid regular expression: {0}")]
    Regex(#[from] regex::Error),
}

impl HarvesterError {
    /// Whether this error comes from a misauthored rule rather than from input data.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Regex(_))
    }
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;
