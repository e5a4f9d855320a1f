//! Immutable search query assembled once from CLI flags and config defaults.

use std::fmt;
use std::str::FromStr;

use super::error::QueryError;

/// Number of items the search API returns per page.
pub const PAGE_SIZE: u64 = 24;

/// Parses a 3-character `0`/`1` string into three flags.
fn parse_mask(kind: &'static str, raw: &str) -> Result<[bool; 3], QueryError> {
    let bytes = raw.as_bytes();
    if bytes.len() != 3 {
        return Err(QueryError::invalid_mask(kind, raw));
    }
    let mut bits = [false; 3];
    for (slot, byte) in bits.iter_mut().zip(bytes) {
        *slot = match byte {
            b'1' => true,
            b'0' => false,
            _ => return Err(QueryError::invalid_mask(kind, raw)),
        };
    }
    Ok(bits)
}

fn render_mask(bits: [bool; 3]) -> String {
    bits.iter().map(|on| if *on { '1' } else { '0' }).collect()
}

/// Content category bitmask: `general`, `anime`, `people`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Categories {
    pub general: bool,
    pub anime: bool,
    pub people: bool,
}

impl Default for Categories {
    fn default() -> Self {
        Self {
            general: true,
            anime: true,
            people: true,
        }
    }
}

impl FromStr for Categories {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [general, anime, people] = parse_mask("categories", s)?;
        Ok(Self {
            general,
            anime,
            people,
        })
    }
}

impl fmt::Display for Categories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_mask([self.general, self.anime, self.people]))
    }
}

/// Purity bitmask: `sfw`, `sketchy`, `nsfw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Purity {
    pub sfw: bool,
    pub sketchy: bool,
    pub nsfw: bool,
}

impl Default for Purity {
    fn default() -> Self {
        Self {
            sfw: true,
            sketchy: false,
            nsfw: false,
        }
    }
}

impl FromStr for Purity {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [sfw, sketchy, nsfw] = parse_mask("purity", s)?;
        Ok(Self { sfw, sketchy, nsfw })
    }
}

impl fmt::Display for Purity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_mask([self.sfw, self.sketchy, self.nsfw]))
    }
}

/// Generates a closed token enum with `FromStr`/`Display` over its wire names.
macro_rules! token_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $token:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Wire token sent to the search API.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $token),+
                }
            }
        }

        impl FromStr for $name {
            type Err = QueryError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($token => Ok(Self::$variant),)+
                    other => Err(QueryError::invalid_token($kind, other)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

token_enum!(
    /// Sort key for search results.
    Sorting, "sorting" {
        DateAdded => "date_added",
        Relevance => "relevance",
        Random => "random",
        Views => "views",
        Favorites => "favorites",
        Toplist => "toplist",
        Hot => "hot",
    }
);

token_enum!(
    /// Sort direction.
    Order, "order" {
        Desc => "desc",
        Asc => "asc",
    }
);

token_enum!(
    /// Relative time window used by the `toplist` sort.
    TopRange, "topRange" {
        OneDay => "1d",
        ThreeDays => "3d",
        OneWeek => "1w",
        OneMonth => "1M",
        ThreeMonths => "3M",
        SixMonths => "6M",
        OneYear => "1y",
    }
);

/// Search parameters shared by every page request of a run.
///
/// Built once through [`SearchQueryBuilder`] and passed by reference to each
/// page fetch. The credential and page number are always emitted; every other
/// parameter is only sent when set.
#[derive(Clone, PartialEq, Eq)]
pub struct SearchQuery {
    api_key: String,
    categories: Option<Categories>,
    purity: Option<Purity>,
    sorting: Option<Sorting>,
    order: Option<Order>,
    top_range: Option<TopRange>,
    text: Option<String>,
}

impl SearchQuery {
    /// Starts a query for the given API credential.
    #[must_use]
    pub fn builder(api_key: impl Into<String>) -> SearchQueryBuilder {
        SearchQueryBuilder {
            query: Self {
                api_key: api_key.into(),
                categories: None,
                purity: None,
                sorting: None,
                order: None,
                top_range: None,
                text: None,
            },
        }
    }

    /// Returns the API credential.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the configured sort key, if any.
    #[must_use]
    pub fn sorting(&self) -> Option<Sorting> {
        self.sorting
    }

    /// Request parameters for `page`, in a stable order.
    #[must_use]
    pub fn params(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(8);
        params.push(("apikey", self.api_key.clone()));
        if let Some(categories) = self.categories {
            params.push(("categories", categories.to_string()));
        }
        if let Some(purity) = self.purity {
            params.push(("purity", purity.to_string()));
        }
        if let Some(text) = &self.text {
            params.push(("q", text.clone()));
        }
        if let Some(sorting) = self.sorting {
            params.push(("sorting", sorting.to_string()));
        }
        if let Some(order) = self.order {
            params.push(("order", order.to_string()));
        }
        // The API ignores topRange outside the toplist sort.
        if self.sorting == Some(Sorting::Toplist)
            && let Some(top_range) = self.top_range
        {
            params.push(("topRange", top_range.to_string()));
        }
        params.push(("page", page.to_string()));
        params
    }
}

impl fmt::Debug for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchQuery")
            .field("api_key", &"<redacted>")
            .field("categories", &self.categories)
            .field("purity", &self.purity)
            .field("sorting", &self.sorting)
            .field("order", &self.order)
            .field("top_range", &self.top_range)
            .field("text", &self.text)
            .finish()
    }
}

/// Builder for [`SearchQuery`].
#[derive(Debug, Clone)]
pub struct SearchQueryBuilder {
    query: SearchQuery,
}

impl SearchQueryBuilder {
    #[must_use]
    pub fn categories(mut self, categories: Categories) -> Self {
        self.query.categories = Some(categories);
        self
    }

    #[must_use]
    pub fn purity(mut self, purity: Purity) -> Self {
        self.query.purity = Some(purity);
        self
    }

    #[must_use]
    pub fn sorting(mut self, sorting: Sorting) -> Self {
        self.query.sorting = Some(sorting);
        self
    }

    #[must_use]
    pub fn order(mut self, order: Order) -> Self {
        self.query.order = Some(order);
        self
    }

    #[must_use]
    pub fn top_range(mut self, top_range: TopRange) -> Self {
        self.query.top_range = Some(top_range);
        self
    }

    /// Sets the free-text query; blank text is treated as unset.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.query.text = if text.trim().is_empty() {
            None
        } else {
            Some(text)
        };
        self
    }

    #[must_use]
    pub fn build(self) -> SearchQuery {
        self.query
    }
}
