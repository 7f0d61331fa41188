//! State module for tracking crawl progress
//!
//! A page row carries no explicit state column: its status is derived from the
//! write-once `fetched` and `failed` timestamps.

mod page_status;

pub use page_status::PageStatus;
