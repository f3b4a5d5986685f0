//! Feed probing: URL construction, metadata fetch, page probing, and the
//! adaptive limit search.
//!
//! The module is organized leaves-first:
//!
//! - `url` - builds feed page URLs from a store domain
//! - `fetch` - the shared HTTP transport with per-host admission control
//! - `info` - the feed's summary metadata (`info` URL variant)
//! - `probe` - fetches every page of one generation concurrently
//! - `search` - sequential generations with a shrinking candidate limit
//!
//! Generations never overlap: `search` waits for each probe to finish
//! before deciding whether to halve the limit and go again.

mod fetch;
mod info;
mod probe;
mod search;
mod url;

pub use self::url::{feed_url, info_url, FeedParams, UrlError, FEED_PATH};
pub use fetch::{FeedClient, FetchError};
pub use info::{fetch_info, FeedInfo, InfoError};
pub use probe::{probe_pages, ProbeError, ProbeProgress};
pub use search::{check_limit, SearchError, SearchOutcome};
