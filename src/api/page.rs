//! Search result envelope decoding.

use serde::{Deserialize, Deserializer};

use super::error::ApiError;

/// One entry of a search result page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResultItem {
    /// Gallery identifier, when the API provides one.
    #[serde(default)]
    pub id: Option<String>,
    /// Full URL of the downloadable image.
    pub path: String,
    /// Size in bytes as advertised by the search API.
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// Pagination metadata attached to a result page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageMeta {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub current_page: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub last_page: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub per_page: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total: Option<u64>,
}

/// A decoded page: its items in API order plus optional pagination metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub items: Vec<ResultItem>,
    pub meta: Option<PageMeta>,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Vec<ResultItem>>,
    #[serde(default)]
    meta: Option<PageMeta>,
}

impl SearchPage {
    /// Decodes a response body for `page`.
    ///
    /// An absent, `null`, or empty `data` array yields an empty page.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] when the body is not a JSON object of the
    /// expected shape.
    pub fn from_slice(page: u32, body: &[u8]) -> Result<Self, ApiError> {
        let envelope: Envelope =
            serde_json::from_slice(body).map_err(|e| ApiError::parse(page, e))?;
        Ok(Self {
            items: envelope.data.unwrap_or_default(),
            meta: envelope.meta,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when metadata says no further pages exist.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.meta
            .and_then(|meta| Some(meta.last_page? <= meta.current_page?))
            .unwrap_or(false)
    }

    /// Total result count reported by the API, if any.
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        self.meta.and_then(|meta| meta.total)
    }
}

/// Accepts `24`, `"24"`, or `null`; the API is inconsistent about numeric fields.
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
