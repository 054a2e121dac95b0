//! Remote seams used by sessions and lookups.

use async_trait::async_trait;
use explorer_core::Result;
use explorer_dip::{Dataset, DipClient, PersonPage, QueryParams, SearchPage};

/// Executes one page of a dataset query.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, dataset: Dataset, params: &QueryParams) -> Result<SearchPage>;
}

/// Resolves free-text person queries to suggestions.
#[async_trait]
pub trait PersonDirectory: Send + Sync {
    async fn search_persons(&self, query: &str, cursor: Option<&str>) -> Result<PersonPage>;
}

#[async_trait]
impl SearchBackend for DipClient {
    async fn search(&self, dataset: Dataset, params: &QueryParams) -> Result<SearchPage> {
        DipClient::search(self, dataset, params).await
    }
}

#[async_trait]
impl PersonDirectory for DipClient {
    async fn search_persons(&self, query: &str, cursor: Option<&str>) -> Result<PersonPage> {
        DipClient::search_persons(self, query, cursor).await
    }
}
