//! Encyclopedia acquisition: page fetch + infobox extraction.
//!
//! The only network operation is a single GET of the subject's article page;
//! everything else is tree traversal over the parsed HTML. Extraction is
//! split out as [`infobox::parse_infobox`] so it can be exercised on raw
//! markup without a server.

pub mod infobox;

pub use infobox::{FactRow, Infobox, WikiClient, WikiError, parse_infobox};
