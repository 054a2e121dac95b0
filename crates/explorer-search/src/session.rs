//! Search session: one logical query with cursor-based "load more".
//!
//! Pages are appended, never replaced. Both operations take `&mut self`, so
//! a session can have at most one request in flight.

use std::sync::Arc;

use explorer_core::Result;
use explorer_dip::{Dataset, Document, QueryParams};
use serde::Serialize;
use tracing::{debug, info};

use crate::backend::SearchBackend;
use crate::filters::{build_params, FilterState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No query issued yet, or the last initial query failed.
    Idle,
    /// The first page is outstanding.
    Querying,
    /// At least one page is loaded.
    Ready,
    /// A follow-up page is outstanding.
    QueryingMore,
}

/// Accumulated results of one search.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResult {
    pub documents: Vec<Document>,
    /// Continuation token; `None` means no further pages.
    pub cursor: Option<String>,
    #[serde(rename = "numFound")]
    pub num_found: u64,
    /// Parameters of the original query, reused for every follow-up page.
    #[serde(rename = "queryParams")]
    pub query_params: Option<QueryParams>,
}

impl SearchResult {
    pub fn has_more(&self) -> bool {
        self.cursor.is_some()
    }
}

/// Marks a request as outstanding. Dropping it, including when the request
/// future is cancelled, leaves the session in the settled phase.
struct InFlight<'a> {
    phase: &'a mut SessionPhase,
    settled: SessionPhase,
}

impl<'a> InFlight<'a> {
    fn start(phase: &'a mut SessionPhase, busy: SessionPhase, settled: SessionPhase) -> Self {
        *phase = busy;
        Self { phase, settled }
    }

    fn finish(mut self, settled: SessionPhase) {
        self.settled = settled;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.phase = self.settled;
    }
}

pub struct SearchSession {
    backend: Arc<dyn SearchBackend>,
    dataset: Dataset,
    phase: SessionPhase,
    result: SearchResult,
}

impl SearchSession {
    pub fn new(backend: Arc<dyn SearchBackend>, dataset: Dataset) -> Self {
        Self {
            backend,
            dataset,
            phase: SessionPhase::Idle,
            result: SearchResult::default(),
        }
    }

    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn result(&self) -> &SearchResult {
        &self.result
    }

    pub fn documents(&self) -> &[Document] {
        &self.result.documents
    }

    /// Switch dataset. Stored parameters and cursor belong to the old
    /// dataset, so they are discarded.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        if dataset != self.dataset {
            self.dataset = dataset;
            self.invalidate();
        }
    }

    /// Drop all results and pagination context.
    pub fn invalidate(&mut self) {
        self.result = SearchResult::default();
        self.phase = SessionPhase::Idle;
    }

    /// Run a new search from the filter form.
    pub async fn search(&mut self, filters: &FilterState) -> Result<&SearchResult> {
        self.search_params(build_params(filters)).await
    }

    /// Run a new search with prepared parameters.
    ///
    /// The result set is reset before the request; on failure it stays
    /// empty (with the attempted parameters recorded).
    pub async fn search_params(&mut self, params: QueryParams) -> Result<&SearchResult> {
        self.result = SearchResult {
            query_params: Some(params.clone()),
            ..Default::default()
        };
        let in_flight = InFlight::start(&mut self.phase, SessionPhase::Querying, SessionPhase::Idle);

        info!("Searching {} with {} filter(s)", self.dataset, params.len());

        let page = self.backend.search(self.dataset, &params).await?;
        in_flight.finish(SessionPhase::Ready);
        self.result.documents = page.documents;
        self.result.cursor = page.cursor;
        self.result.num_found = page.num_found.unwrap_or(0);
        Ok(&self.result)
    }

    /// Fetch the next page and append it. Returns the number of documents
    /// added; a session without a cursor is left untouched and returns 0.
    ///
    /// A failed request leaves the loaded documents and cursor intact.
    pub async fn load_more(&mut self) -> Result<usize> {
        let (cursor, params) = match (&self.result.cursor, &self.result.query_params) {
            (Some(c), Some(p)) => (c.clone(), p.with_cursor(c)),
            _ => return Ok(0),
        };

        let in_flight = InFlight::start(&mut self.phase, SessionPhase::QueryingMore, SessionPhase::Ready);
        debug!("Loading more {} after cursor {}", self.dataset, cursor);

        let page = self.backend.search(self.dataset, &params).await;
        drop(in_flight);
        let page = page?;

        let appended = page.documents.len();
        self.result.documents.extend(page.documents);
        // DIP echoes the request cursor once the listing is exhausted.
        self.result.cursor = page.cursor.filter(|next| *next != cursor);
        if let Some(n) = page.num_found {
            self.result.num_found = n;
        }

        Ok(appended)
    }
}
