use crate::parser::{ParseError, parse_member_detail, parse_member_refs};
use crate::types::MemberRecord;

use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("{url} responded with {status}")]
    Status { url: String, status: StatusCode },
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
}

/// Substitutes a listing reference into a `{}` URL template verbatim.
pub fn fill_template(template: &str, reference: &str) -> String {
    template.replacen("{}", reference, 1)
}

/// Anything that can serve the listing and detail pages as HTML.
///
/// The fetch operations are provided on top of [`get_html`](Self::get_html),
/// so alternative sources only need to supply raw pages.
pub trait PageSource: Sync {
    fn listing_url(&self) -> &str;

    fn detail_template(&self) -> &str;

    fn get_html(&self, url: &str) -> impl Future<Output = Result<String, ScraperError>> + Send;

    fn detail_url(&self, reference: &str) -> String {
        fill_template(self.detail_template(), reference)
    }

    fn fetch_member_refs(&self) -> impl Future<Output = Result<Vec<String>, ScraperError>> + Send {
        async move {
            log::info!("Fetching member listing from {}...", self.listing_url());
            let html = self.get_html(self.listing_url()).await?;
            Ok(parse_member_refs(&html)?)
        }
    }

    fn fetch_member_record(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<MemberRecord, ScraperError>> + Send {
        async move {
            log::info!("Fetching member detail: {}", url);
            let html = self.get_html(url).await?;
            Ok(parse_member_detail(&html))
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    listing_url: String,
    detail_template: String,
}

impl WebScraper {
    pub fn new() -> Result<Self, ScraperError> {
        Self::with_urls(crate::LISTING_URL, crate::DETAIL_URL_TEMPLATE)
    }

    pub fn with_urls(
        listing_url: impl Into<String>,
        detail_template: impl Into<String>,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            listing_url: listing_url.into(),
            detail_template: detail_template.into(),
        })
    }

    /// Resolves either a full URL or a bare listing reference to a detail URL.
    pub fn resolve_detail_url(&self, url_or_ref: &str) -> String {
        if url_or_ref.starts_with("http") {
            url_or_ref.to_string()
        } else {
            self.detail_url(url_or_ref)
        }
    }
}

impl PageSource for WebScraper {
    fn listing_url(&self) -> &str {
        &self.listing_url
    }

    fn detail_template(&self) -> &str {
        &self.detail_template
    }

    async fn get_html(&self, url: &str) -> Result<String, ScraperError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_substitutes_reference_verbatim() {
        assert_eq!(
            fill_template(crate::DETAIL_URL_TEMPLATE, "1021"),
            "http://tasi.org/en/member/index_member_02.asp?F=1021"
        );
        assert_eq!(
            fill_template("http://h/?F={}", "a b&c"),
            "http://h/?F=a b&c"
        );
    }

    #[test]
    fn test_resolve_detail_url() {
        let scraper = WebScraper::new().expect("Failed to build scraper");

        assert_eq!(
            scraper.resolve_detail_url("77"),
            "http://tasi.org/en/member/index_member_02.asp?F=77"
        );
        assert_eq!(
            scraper.resolve_detail_url("https://example.org/member?F=1"),
            "https://example.org/member?F=1"
        );
    }

    #[test]
    fn test_with_urls_overrides_defaults() {
        let scraper = WebScraper::with_urls("http://localhost/list", "http://localhost/d/{}")
            .expect("Failed to build scraper");

        assert_eq!(scraper.listing_url(), "http://localhost/list");
        assert_eq!(scraper.detail_url("9"), "http://localhost/d/9");
    }
}
