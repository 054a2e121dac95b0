//! Debounced incremental person lookup.
//!
//! Each keystroke bumps a generation counter. A query is sent once the input
//! has been quiet for [`PERSON_DEBOUNCE`], and a response is only applied if
//! its generation is still the newest, so a slow stale request can never
//! overwrite the suggestions of a later one.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use explorer_dip::PersonRef;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::backend::PersonDirectory;

pub const PERSON_DEBOUNCE: Duration = Duration::from_millis(350);

/// Queries shorter than this (after trimming) never reach the network.
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Default)]
struct LookupState {
    options: Vec<PersonRef>,
    loading: bool,
    generation: u64,
    timer: Option<JoinHandle<()>>,
    timer_armed: bool,
}

/// Person suggestions for one filter form.
pub struct PersonLookup {
    directory: Arc<dyn PersonDirectory>,
    debounce: Duration,
    state: Arc<Mutex<LookupState>>,
    changed: Arc<Notify>,
}

impl PersonLookup {
    pub fn new(directory: Arc<dyn PersonDirectory>) -> Self {
        Self::with_debounce(directory, PERSON_DEBOUNCE)
    }

    pub fn with_debounce(directory: Arc<dyn PersonDirectory>, debounce: Duration) -> Self {
        Self {
            directory,
            debounce,
            state: Arc::new(Mutex::new(LookupState::default())),
            changed: Arc::new(Notify::new()),
        }
    }

    /// Feed the current input text. Must be called from within a tokio
    /// runtime.
    pub fn on_query_change(&self, query: &str) {
        let query = query.trim().to_string();

        let generation = {
            let mut state = self.state.lock();
            state.generation += 1;
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }

            if query.chars().count() < MIN_QUERY_CHARS {
                state.loading = false;
                state.timer_armed = false;
                drop(state);
                self.changed.notify_waiters();
                return;
            }

            state.timer_armed = true;
            state.generation
        };

        let directory = self.directory.clone();
        let state = self.state.clone();
        let changed = self.changed.clone();
        let debounce = self.debounce;

        let timer = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            {
                let mut s = state.lock();
                if s.generation != generation {
                    return;
                }
                s.timer_armed = false;
                s.loading = true;
            }
            changed.notify_waiters();

            // Detached: later keystrokes abort the timer, not the request.
            tokio::spawn(async move {
                debug!("Person lookup #{} for {:?}", generation, query);
                let result = directory.search_persons(&query, None).await;

                let mut s = state.lock();
                if s.generation != generation {
                    debug!("Dropping stale person lookup #{}", generation);
                    return;
                }
                match result {
                    Ok(page) => s.options = page.options,
                    Err(e) => warn!("Person lookup failed: {}", e),
                }
                s.loading = false;
                drop(s);
                changed.notify_waiters();
            });
        });

        self.state.lock().timer = Some(timer);
    }

    /// Current suggestions from the directory.
    pub fn options(&self) -> Vec<PersonRef> {
        self.state.lock().options.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    /// Generation of the newest input seen.
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Suggestions merged with the persons already selected in the form.
    pub fn combined_options(&self, selected: &[PersonRef]) -> Vec<PersonRef> {
        combined_person_options(&self.options(), selected)
    }

    fn is_idle(&self) -> bool {
        let state = self.state.lock();
        !state.loading && !state.timer_armed
    }

    /// Wait until no debounce timer is armed and no lookup is loading.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }
}

impl Drop for PersonLookup {
    fn drop(&mut self) {
        if let Some(timer) = self.state.lock().timer.take() {
            timer.abort();
        }
    }
}

/// Union of suggestions and selections, deduplicated by id.
///
/// Suggestions keep their order and come first; selections not among them
/// are appended. On an id collision the selected entry's fields are kept.
pub fn combined_person_options(suggestions: &[PersonRef], selected: &[PersonRef]) -> Vec<PersonRef> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::with_capacity(suggestions.len() + selected.len());

    for suggestion in suggestions {
        let key = suggestion.key();
        if key.is_empty() || !seen.insert(key.clone()) {
            continue;
        }
        let entry = selected
            .iter()
            .find(|p| p.key() == key)
            .unwrap_or(suggestion);
        merged.push(entry.clone());
    }

    for person in selected {
        let key = person.key();
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        merged.push(person.clone());
    }

    merged
}
