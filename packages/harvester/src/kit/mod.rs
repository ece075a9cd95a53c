//! Pattern kit system for declarative extraction.
//!
//! A pattern kit pairs a regular expression with a mapping from capture
//! group index to [`FieldName`]. Each field's parser is looked up in a
//! [`ParserRegistry`] once, when the kit is compiled, so binding at parse
//! time never fails on configuration.

mod binder;
mod core;
mod registry;
mod source;
mod types;

pub use binder::{Binding, FieldBinder, Record};
pub use core::{
    EventMetadataPatternKit, FileSourceMetadataPatternKit, PatternKit, PatternKitSet,
    DEFAULT_PART_IDENTIFIER_PATTERN,
};
pub use registry::{create_default_registry, ParserRegistry, ValueParser};
pub use source::{DataSource, FeedKind, ListKit};
pub use types::{FieldKind, FieldName, FieldValue, TargetType};
