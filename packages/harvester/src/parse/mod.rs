//! Document extraction.
//!
//! [`EntryParser`] turns one document into an Event graph with one
//! [`PatternKitSet`](crate::kit::PatternKitSet); [`parse_list`] reads the
//! topic links of a forum listing page.

mod entry;
mod list;
mod text;

pub use entry::{build_event, correlate, parse_with_any, put_in_pack, EntryParser};
pub use list::{parse_list, ListItem};
pub use text::{collapse_whitespace, flatten, Document};
