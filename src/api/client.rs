//! Page fetcher for the search endpoint.

use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};
use url::Url;

use super::error::ApiError;
use super::page::SearchPage;
use super::query::SearchQuery;

/// Default public search endpoint.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://wallhaven.cc/api/v1/search";

/// Fetches and decodes search result pages.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    endpoint: Url,
}

impl SearchClient {
    /// Creates a page fetcher over an existing client (and its connection pool).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidEndpoint`] if `endpoint` is not an absolute
    /// http(s) URL.
    pub fn new(client: Client, endpoint: &str) -> Result<Self, ApiError> {
        let endpoint = Url::parse(endpoint).map_err(|_| ApiError::invalid_endpoint(endpoint))?;
        if endpoint.cannot_be_a_base() || !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ApiError::invalid_endpoint(endpoint.as_str()));
        }
        Ok(Self { client, endpoint })
    }

    /// Endpoint without query parameters; safe to log.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Full request URL for `page`, including the credential.
    #[must_use]
    pub fn request_url(&self, query: &SearchQuery, page: u32) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().extend_pairs(query.params(page));
        url
    }

    /// Fetches one page of results.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Transport`] on connection failure or body read failure
    /// - [`ApiError::Remote`] on any status other than 200
    /// - [`ApiError::Parse`] on a malformed body
    #[instrument(skip(self, query), fields(endpoint = %self.endpoint))]
    pub async fn fetch_page(&self, query: &SearchQuery, page: u32) -> Result<SearchPage, ApiError> {
        let response = self
            .client
            .get(self.request_url(query, page))
            .send()
            .await
            .map_err(|e| ApiError::transport(page, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ApiError::remote(page, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::transport(page, e))?;
        let decoded = SearchPage::from_slice(page, &body)?;
        debug!(items = decoded.items.len(), "page decoded");
        Ok(decoded)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::Sorting;

    #[test]
    fn test_new_rejects_relative_or_non_http_endpoint() {
        assert!(matches!(
            SearchClient::new(Client::new(), "api/v1/search"),
            Err(ApiError::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            SearchClient::new(Client::new(), "ftp://example.com/search"),
            Err(ApiError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_request_url_merges_params_with_page() {
        let search = SearchClient::new(Client::new(), DEFAULT_SEARCH_ENDPOINT).unwrap();
        let query = SearchQuery::builder("k3y")
            .text("red car")
            .sorting(Sorting::Views)
            .build();

        let url = search.request_url(&query, 4);

        assert_eq!(url.path(), "/api/v1/search");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("apikey".into(), "k3y".into()),
                ("q".into(), "red car".into()),
                ("sorting".into(), "views".into()),
                ("page".into(), "4".into()),
            ]
        );
    }

    #[test]
    fn test_endpoint_does_not_carry_credential() {
        let search = SearchClient::new(Client::new(), DEFAULT_SEARCH_ENDPOINT).unwrap();
        let query = SearchQuery::builder("k3y").build();
        let _ = search.request_url(&query, 1);
        assert!(!search.endpoint().as_str().contains("k3y"));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_credential() {
        let search =
            SearchClient::new(Client::new(), "http://127.0.0.1:9/api/v1/search").unwrap();
        let query = SearchQuery::builder("S3CRETKEY").build();

        let error = search.fetch_page(&query, 1).await.unwrap_err();

        assert!(matches!(error, ApiError::Transport { page: 1, .. }));
        let mut rendered = format!("{error} {error:?}");
        let mut source = std::error::Error::source(&error);
        while let Some(cause) = source {
            rendered.push_str(&cause.to_string());
            source = cause.source();
        }
        assert!(!rendered.contains("S3CRETKEY"), "credential leaked: {rendered}");
    }
}
