use crate::feed::fetch::{FeedClient, FetchError};
use crate::feed::info::{fetch_info, FeedInfo, InfoError};
use crate::feed::probe::{probe_pages, ProbeError, ProbeProgress};
use crate::feed::url::{FeedParams, UrlError};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that end a limit check.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Url(#[from] UrlError),
    /// Metadata fetch failed. Fatal in both modes; the info call is never
    /// retried.
    #[error("feed info request failed: {0}")]
    Info(FetchError),
    /// A generation failed in manual mode. The operator picks the next limit.
    #[error("feed pages failed at limit {limit}: {source}")]
    Generation { limit: u32, source: ProbeError },
    /// The halving search ran out of room: the next candidate would not be
    /// smaller than the one that just failed.
    #[error("no working limit found: {limit} is the smallest candidate and it still fails")]
    LimitExhausted { limit: u32 },
}

impl From<InfoError> for SearchError {
    fn from(err: InfoError) -> Self {
        match err {
            InfoError::Url(e) => SearchError::Url(e),
            InfoError::Fetch(e) => SearchError::Info(e),
        }
    }
}

/// Outcome of a completed limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The account has no paginated feed; there is nothing to probe.
    NotPaginated,
    /// Every page fetched successfully with this geometry.
    Found { page_count: u32, limit: u32 },
}

/// Checks whether the domain's feed works at a limit, searching for a
/// smaller one when `auto` is set.
///
/// Fetches the feed descriptor at `params.limit` first; a non-premium
/// account short-circuits before any page is probed. In manual mode a single
/// generation is attempted at the limit the server reports it honors. In
/// auto mode each failing generation halves the honored limit and re-fetches
/// a fresh descriptor until a generation fully succeeds.
pub async fn check_limit(
    client: &FeedClient,
    params: &FeedParams,
    auto: bool,
    progress: Option<mpsc::Sender<ProbeProgress>>,
) -> Result<SearchOutcome, SearchError> {
    let info = fetch_info(client, params).await?;
    if !info.premium {
        return Ok(SearchOutcome::NotPaginated);
    }

    if auto {
        auto_search(client, params, info, progress).await
    } else {
        single_generation(client, params, info, progress).await
    }
}

/// One generation at the server-honored limit. On failure the caller is told
/// to lower the limit; nothing is reduced automatically.
async fn single_generation(
    client: &FeedClient,
    params: &FeedParams,
    info: FeedInfo,
    progress: Option<mpsc::Sender<ProbeProgress>>,
) -> Result<SearchOutcome, SearchError> {
    // The descriptor reports what the server actually honors for the
    // requested limit; that is the value the pages are probed and listed
    // with.
    let limit = info.products_per_page;
    let generation = FeedParams {
        limit,
        page: 0,
        ..params.clone()
    };

    tracing::info!(limit, pages = info.page_count, "probing feed pages");
    probe_pages(client, &generation, info.page_count, progress)
        .await
        .map_err(|source| SearchError::Generation { limit, source })?;

    Ok(SearchOutcome::Found {
        page_count: info.page_count,
        limit,
    })
}

/// Sequential generations with a monotonically shrinking candidate limit.
///
/// Each failing generation computes the next candidate as half the honored
/// `products_per_page` (rounded up) and fetches a fresh descriptor at that
/// candidate, since the page geometry can change with the limit. The search
/// stops with [`SearchError::LimitExhausted`] when the next candidate is
/// zero or would not strictly shrink.
async fn auto_search(
    client: &FeedClient,
    params: &FeedParams,
    first_info: FeedInfo,
    progress: Option<mpsc::Sender<ProbeProgress>>,
) -> Result<SearchOutcome, SearchError> {
    let mut limit = params.limit;
    let mut info = first_info;

    loop {
        tracing::info!(limit, pages = info.page_count, "testing limit");
        let generation = FeedParams {
            limit,
            page: 0,
            ..params.clone()
        };

        match probe_pages(client, &generation, info.page_count, progress.clone()).await {
            Ok(()) => {
                return Ok(SearchOutcome::Found {
                    page_count: info.page_count,
                    limit: info.products_per_page,
                });
            }
            Err(err) => {
                let next = next_candidate(info.products_per_page);
                tracing::warn!(limit, next, error = %err, "limit too high");
                if next == 0 || next >= limit {
                    return Err(SearchError::LimitExhausted { limit });
                }
                limit = next;
                let next_params = FeedParams {
                    limit,
                    page: 0,
                    ..params.clone()
                };
                info = fetch_info(client, &next_params).await?;
            }
        }
    }
}

fn next_candidate(products_per_page: u32) -> u32 {
    products_per_page.div_ceil(2)
}
