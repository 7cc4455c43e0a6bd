//! Listing page fetching and job record extraction.
//!
//! This crate provides:
//! - [`extract_link`]: naive `href` extraction from a single-anchor cell
//! - [`JobTable`]: turns the listing table into [`JobRecord`](jobwatch_shared::JobRecord)s
//! - [`PageFetcher`]: single-attempt HTTP GET of the listing page

pub mod fetch;
pub mod link;
pub mod table;

pub use fetch::PageFetcher;
pub use link::extract_link;
pub use table::JobTable;
