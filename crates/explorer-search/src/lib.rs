//! Search console logic: filter form ↔ query parameters, debounced person
//! lookup, cursor-paginated search sessions and result presentation.
//!
//! Remote calls go through the `SearchBackend` and `PersonDirectory` seams;
//! `DipClient` implements both.

pub mod backend;
pub mod filters;
pub mod lookup;
pub mod presentation;
pub mod session;

pub use backend::{PersonDirectory, SearchBackend};
pub use filters::{build_params, defaults_to_filter_state, FilterState};
pub use lookup::{combined_person_options, PersonLookup, MIN_QUERY_CHARS, PERSON_DEBOUNCE};
pub use presentation::{display_title, metadata_overview, resolve_text_content, select_document, source_links};
pub use session::{SearchResult, SearchSession, SessionPhase};
