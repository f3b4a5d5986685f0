use thiserror::Error;
use url::Url;

/// Fixed path of the feed resource on every storefront.
pub const FEED_PATH: &str = "/a/feed/v2/facebook.rss";

/// Errors that can occur while turning a store domain into a feed URL.
#[derive(Debug, Error)]
pub enum UrlError {
    /// The domain string could not be parsed as a URL, even with a scheme
    /// prepended. Fatal to the whole run.
    #[error("invalid store domain '{0}'")]
    InvalidDomain(String),
}

/// Request parameters for one feed page.
///
/// A pure value: `page` and `limit` of zero mean "omit the parameter",
/// matching what the service expects for the unpaginated default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedParams {
    /// Store domain as given by the operator, with or without a scheme.
    pub domain: String,
    /// Feed page number, 1-based. 0 omits the `page` parameter.
    pub page: u32,
    /// Products per page. 0 omits the `limit` parameter.
    pub limit: u32,
    /// Emit only the first available variant per product.
    pub no_variants: bool,
}

/// Builds the absolute URL for one feed page.
///
/// The domain is parsed as a URL; a missing scheme defaults to `http`, and a
/// bare hostname is treated as the host. Any path or query already present
/// on the input is discarded. Query parameters are emitted in a fixed order,
/// so identical inputs always produce byte-identical URLs.
pub fn feed_url(params: &FeedParams) -> Result<Url, UrlError> {
    build(params, false)
}

/// Builds the metadata variant of the feed URL: the page URL with the
/// presence-only `info` flag appended.
pub fn info_url(params: &FeedParams) -> Result<Url, UrlError> {
    build(params, true)
}

fn build(params: &FeedParams, info: bool) -> Result<Url, UrlError> {
    let mut url = parse_domain(&params.domain)?;
    url.set_path(FEED_PATH);
    url.set_query(None);

    {
        let mut query = url.query_pairs_mut();
        if info {
            query.append_pair("info", "");
        }
        if params.limit != 0 {
            query.append_pair("limit", &params.limit.to_string());
        }
        if params.no_variants {
            query.append_pair("no_variants", "");
        }
        if params.page != 0 {
            query.append_pair("page", &params.page.to_string());
        }
    }

    // query_pairs_mut leaves an empty query string when nothing was appended
    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}

fn parse_domain(domain: &str) -> Result<Url, UrlError> {
    if let Ok(url) = Url::parse(domain) {
        if url.host_str().is_some() {
            return Ok(url);
        }
    }

    // No scheme (or a bare `host:port` that parsed as scheme + path):
    // treat the whole input as a host and default to http.
    Url::parse(&format!("http://{domain}"))
        .ok()
        .filter(|url| url.host_str().is_some())
        .ok_or_else(|| UrlError::InvalidDomain(domain.to_owned()))
}
