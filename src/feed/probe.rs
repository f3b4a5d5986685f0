use crate::feed::fetch::{FeedClient, FetchError};
use crate::feed::url::{feed_url, FeedParams, UrlError};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Progress signal emitted as pages complete: (succeeded, total).
pub type ProbeProgress = (u32, u32);

/// Errors from probing one feed generation.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Url(#[from] UrlError),
    /// First page-level failure encountered in the generation.
    #[error("page {page} failed: {source}")]
    Page { page: u32, source: FetchError },
    /// The result channel closed before every page reported. Only possible
    /// if a page task panicked.
    #[error("generation ended after {succeeded} of {expected} pages")]
    Incomplete { succeeded: u32, expected: u32 },
}

/// Fetches pages `1..=page_count` concurrently and reports overall success
/// or the first failure.
///
/// Every page gets its own task, all launched together; the per-host limiter
/// inside the client caps how many requests are actually in flight. The
/// first failure is returned immediately: remaining tasks are cancelled and
/// anything still on the wire is discarded. Success is declared only once
/// all `page_count` pages have reported.
pub async fn probe_pages(
    client: &FeedClient,
    params: &FeedParams,
    page_count: u32,
    progress: Option<mpsc::Sender<ProbeProgress>>,
) -> Result<(), ProbeError> {
    if page_count == 0 {
        return Ok(());
    }

    // Build every URL up front so a bad domain fails before any task spawns.
    let urls = (1..=page_count)
        .map(|page| {
            feed_url(&FeedParams {
                page,
                ..params.clone()
            })
            .map(|url| (page, url))
        })
        .collect::<Result<Vec<(u32, Url)>, UrlError>>()?;

    let cancel = CancellationToken::new();
    let (tx, mut rx) = mpsc::channel::<Result<u32, (u32, FetchError)>>(page_count as usize);

    for (page, url) in urls {
        let client = client.clone();
        let cancel = cancel.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => return,
                result = client.get(&url) => match result {
                    Ok(_) => Ok(page),
                    Err(err) => Err((page, err)),
                },
            };
            // A closed receiver means the generation is already decided.
            let _ = tx.send(outcome).await;
        });
    }
    drop(tx);

    let mut succeeded = 0u32;
    while let Some(outcome) = rx.recv().await {
        match outcome {
            Ok(page) => {
                succeeded += 1;
                tracing::debug!(page, succeeded, total = page_count, "feed page ok");
                if let Some(progress) = &progress {
                    let _ = progress.send((succeeded, page_count)).await;
                }
                if succeeded == page_count {
                    return Ok(());
                }
            }
            Err((page, source)) => {
                cancel.cancel();
                return Err(ProbeError::Page { page, source });
            }
        }
    }

    Err(ProbeError::Incomplete {
        succeeded,
        expected: page_count,
    })
}
