//! feedprobe — probe a storefront's paginated product feed for a working
//! `limit` parameter and enumerate the resulting page URLs.
//!
//! The interesting work lives in [`feed`]: a bounded-concurrency page
//! prober and an adaptive search that halves the limit until a full
//! generation of pages fetches cleanly.

pub mod cli;
pub mod config;
pub mod feed;
pub mod util;
