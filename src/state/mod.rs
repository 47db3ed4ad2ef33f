//! State module for tracking crawl progress
//!
//! - `PageState`: the fetch/parse state of an individual page

mod page_state;

pub use page_state::PageState;
