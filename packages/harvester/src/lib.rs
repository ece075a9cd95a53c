//! Matchday Harvester - Extract football events and their video sources.
//!
//! This crate applies configurable pattern kits (regular expressions with
//! typed capture-group bindings) to documents published by blogs and forums,
//! producing [`Event`]s with their [`VideoFileSource`](types::VideoFileSource)s,
//! and walks paginated feeds to collect those documents.
//!
//! # Example
//!
//! ```
//! use matchday_harvester::types::{Fixture, Season};
//!
//! assert_eq!(Season::parse("23/24").unwrap().to_string(), "2023/2024");
//! assert_eq!(Fixture::parse("Semi-Final").unwrap(), Fixture::SEMI_FINAL);
//! ```
//!
//! # Architecture
//!
//! The harvester is organized into several modules:
//!
//! - [`config`]: Configuration constants and validation
//! - [`types`]: Core data types (Event, Season, Fixture, VideoFileSource, etc.)
//! - [`error`]: Error types and Result alias
//! - [`kit`]: Pattern kits, value parsers and data source definitions
//! - [`parse`]: Extraction of Events from documents and forum listings
//! - [`feed`]: Blogger feed readers and snapshot requests
//! - [`http`]: The fetch capability and its HTTP client
//! - [`harvester`]: Paginated harvesting
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod harvester;
pub mod http;
pub mod kit;
pub mod parse;
pub mod types;

// Re-export main entry points
pub use harvester::{Harvester, Snapshot, StopReason};
pub use parse::{parse_with_any, EntryParser};

// Re-export commonly used items
pub use config::{validate_date, HarvestConfig};
pub use error::{HarvesterError, Result};
pub use kit::{DataSource, PatternKitSet};
pub use types::{Event, Fixture, Season};
