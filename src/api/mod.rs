//! Search API: query model, page fetcher, and result envelope.

mod client;
mod error;
mod page;
mod query;

pub use client::{DEFAULT_SEARCH_ENDPOINT, SearchClient};
pub use error::{ApiError, QueryError};
pub use page::{PageMeta, ResultItem, SearchPage};
pub use query::{
    Categories, Order, PAGE_SIZE, Purity, SearchQuery, SearchQueryBuilder, Sorting, TopRange,
};
