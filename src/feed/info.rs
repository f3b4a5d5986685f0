use crate::feed::fetch::{FeedClient, FetchError};
use crate::feed::url::{info_url, FeedParams, UrlError};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while fetching feed metadata. Always fatal to the
/// run; there is no retry for the info call.
#[derive(Debug, Error)]
pub enum InfoError {
    #[error(transparent)]
    Url(#[from] UrlError),
    #[error("feed info request failed: {0}")]
    Fetch(#[from] FetchError),
}

/// Summary metadata reported by the feed's `info` variant.
///
/// `products_per_page` is the limit the server actually honors for the
/// requested limit, which may differ from what was asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedInfo {
    pub premium: bool,
    pub page_count: u32,
    pub products_per_page: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Envelope {
    channel: Channel,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct Channel {
    premium: bool,
    pagecount: u32,
    products_per_page: u32,
}

impl FeedInfo {
    /// Parses the XML envelope of an info response.
    ///
    /// Malformed documents yield a zero-valued descriptor rather than an
    /// error; callers cannot assume a returned descriptor was actually
    /// parsed. This mirrors the service's habit of serving non-XML bodies
    /// on this endpoint.
    pub fn parse(bytes: &[u8]) -> FeedInfo {
        let text = String::from_utf8_lossy(bytes);
        match quick_xml::de::from_str::<Envelope>(&text) {
            Ok(envelope) => FeedInfo {
                premium: envelope.channel.premium,
                page_count: envelope.channel.pagecount,
                products_per_page: envelope.channel.products_per_page,
            },
            Err(err) => {
                tracing::debug!(error = %err, "feed info did not parse, using empty descriptor");
                FeedInfo::default()
            }
        }
    }
}

/// One metadata round trip: GET the page-0 URL with the `info` flag and
/// parse the XML envelope.
pub async fn fetch_info(client: &FeedClient, params: &FeedParams) -> Result<FeedInfo, InfoError> {
    let url = info_url(params)?;
    tracing::debug!(url = %url, "fetching feed info");
    let body = client.get(&url).await?;
    Ok(FeedInfo::parse(&body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_full_envelope() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <premium>true</premium>
    <pagecount>5</pagecount>
    <products-per-page>200</products-per-page>
</channel></rss>"#;

        let info = FeedInfo::parse(xml.as_bytes());
        assert_eq!(
            info,
            FeedInfo {
                premium: true,
                page_count: 5,
                products_per_page: 200,
            }
        );
    }

    #[test]
    fn unknown_elements_are_ignored() {
        let xml = r#"<rss><channel>
    <title>Some Store</title>
    <premium>false</premium>
    <pagecount>0</pagecount>
    <link>https://shop.example.com</link>
</channel></rss>"#;

        let info = FeedInfo::parse(xml.as_bytes());
        assert!(!info.premium);
        assert_eq!(info.page_count, 0);
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let info = FeedInfo::parse(b"<rss><channel><premium>true</premium></channel></rss>");
        assert!(info.premium);
        assert_eq!(info.page_count, 0);
        assert_eq!(info.products_per_page, 0);
    }

    #[test]
    fn malformed_xml_yields_empty_descriptor() {
        let info = FeedInfo::parse(b"<not valid xml");
        assert_eq!(info, FeedInfo::default());
    }

    #[test]
    fn html_error_page_yields_empty_descriptor() {
        let info = FeedInfo::parse(b"<html><body>502 Bad Gateway</body></html>");
        assert_eq!(info, FeedInfo::default());
    }
}
