//! Creator search controller behind the search modal.
//!
//! Keystrokes go through [`SearchController::submit_query_change`], which only
//! schedules work. Timers and provider calls run as tokio tasks that report back
//! over a channel; the owner of the controller drains it with
//! [`SearchController::tick`] (or [`SearchController::pump`] from a frame loop),
//! and that is the only place where searches start and results land.
//!
//! Every scheduled timer and request carries a generation number. A completion
//! whose generation no longer matches the live slot is dropped, so a superseded
//! request can never overwrite newer state even if its cancellation lost the race.

pub mod normalize;
pub mod selection;

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::provider::SearchProvider;
use crate::state::{Creator, SearchState, SEARCH_FAILED_MESSAGE};

use self::normalize::normalize_page;
use self::selection::{Key, KeyAction, Selection};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

enum Completion {
    DebounceElapsed {
        generation: u64,
        text: String,
    },
    SearchFinished {
        generation: u64,
        query: String,
        outcome: anyhow::Result<serde_json::Value>,
    },
}

struct PendingDebounce {
    generation: u64,
    timer: JoinHandle<()>,
}

impl Drop for PendingDebounce {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

/// Live request slot. Dropping it closes the cancel channel, which also cancels.
struct InFlight {
    generation: u64,
    query: String,
    cancel: oneshot::Sender<()>,
}

impl InFlight {
    fn cancel(self) {
        debug!("Cancelling creator search for \"{}\"", self.query);
        let _ = self.cancel.send(());
    }
}

pub struct SearchController {
    provider: Arc<dyn SearchProvider>,
    debounce: Duration,
    runtime: Handle,

    query: String,
    state: SearchState,
    selection: Selection,

    generation: u64,
    pending_debounce: Option<PendingDebounce>,
    in_flight: Option<InFlight>,

    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,

    disposed: bool,
}

impl SearchController {
    pub fn new(provider: Arc<dyn SearchProvider>, debounce: Duration, runtime: Handle) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            provider,
            debounce,
            runtime,
            query: String::new(),
            state: SearchState::Idle,
            selection: Selection::new(),
            generation: 0,
            pending_debounce: None,
            in_flight: None,
            completion_tx,
            completion_rx,
            disposed: false,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn results(&self) -> &[Creator] {
        self.state.results()
    }

    pub fn selected_index(&self) -> isize {
        self.selection.index()
    }

    /// True while a debounce timer or a request is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending_debounce.is_some() || self.in_flight.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Records the new input text and (re)starts the debounce timer.
    ///
    /// Blank text cancels everything outstanding and goes straight to `Idle`.
    pub fn submit_query_change(&mut self, text: impl Into<String>) {
        if self.disposed {
            debug!("submit_query_change after dispose ignored");
            return;
        }
        self.query = text.into();
        self.pending_debounce = None;

        if self.query.trim().is_empty() {
            if let Some(prev) = self.in_flight.take() {
                prev.cancel();
            }
            self.set_state(SearchState::Idle);
            return;
        }

        let generation = self.next_generation();
        let text = self.query.clone();
        let tx = self.completion_tx.clone();
        let delay = self.debounce;
        let timer = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Completion::DebounceElapsed { generation, text });
        });
        self.pending_debounce = Some(PendingDebounce { generation, timer });
    }

    /// Re-runs the query that produced the current `Error`. No-op in any other state.
    pub fn retry(&mut self) {
        if self.disposed {
            return;
        }
        if let SearchState::Error { query, .. } = &self.state {
            let query = query.clone();
            debug!("Retrying creator search for \"{}\"", query);
            self.execute_search(query);
        }
    }

    pub fn handle_key(&mut self, key: Key) -> KeyAction {
        if self.disposed {
            return KeyAction::None;
        }
        match key {
            Key::ArrowDown => {
                self.selection.move_down(self.state.results().len());
                KeyAction::None
            }
            Key::ArrowUp => {
                self.selection.move_up();
                KeyAction::None
            }
            Key::Enter => self.selection.activate(self.state.results(), &self.query),
            Key::Escape => KeyAction::Close,
        }
    }

    /// A row was clicked: select it and act as Enter would.
    pub fn select(&mut self, index: usize) -> KeyAction {
        if self.disposed {
            return KeyAction::None;
        }
        let Ok(index) = isize::try_from(index) else {
            return KeyAction::None;
        };
        let len = self.state.results().len();
        if !self.selection.set(index, len) {
            return KeyAction::None;
        }
        self.selection.activate(self.state.results(), &self.query)
    }

    /// Pointer moved over a row.
    pub fn hover(&mut self, index: isize) -> bool {
        !self.disposed && self.selection.set(index, self.state.results().len())
    }

    /// Waits for the next timer firing or request completion and applies it.
    ///
    /// Returns `false` straight away when nothing is outstanding.
    pub async fn tick(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }
        match self.completion_rx.recv().await {
            Some(completion) => {
                self.apply(completion);
                true
            }
            None => false,
        }
    }

    /// Applies completions that already arrived, without waiting.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completion_rx.try_recv() {
            self.apply(completion);
            applied += 1;
        }
        applied
    }

    /// Ticks until no timer or request is left.
    pub async fn settle(&mut self) {
        while self.tick().await {}
    }

    /// Cancels the debounce timer and any request. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.pending_debounce = None;
        if let Some(prev) = self.in_flight.take() {
            prev.cancel();
        }
        self.disposed = true;
        debug!("Search controller disposed");
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn set_state(&mut self, state: SearchState) {
        self.state = state;
        match self.state {
            SearchState::Success { .. } | SearchState::Idle => self.selection.reset(),
            _ => self.selection.clamp(self.state.results().len()),
        }
    }

    fn execute_search(&mut self, text: String) {
        if let Some(prev) = self.in_flight.take() {
            prev.cancel();
        }

        let generation = self.next_generation();
        self.set_state(SearchState::Loading {
            query: text.clone(),
        });

        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let provider = self.provider.clone();
        let tx = self.completion_tx.clone();
        let query = text.clone();
        let runtime = self.runtime.clone();
        self.runtime.spawn(async move {
            // Own task so a panicking provider surfaces as a JoinError instead of silence.
            let call_query = query.clone();
            let mut call =
                runtime.spawn(async move { provider.search_creators(&call_query).await });
            tokio::select! {
                joined = &mut call => {
                    let outcome = joined.unwrap_or_else(|e| {
                        Err(anyhow::anyhow!("Creator search task failed: {}", e))
                    });
                    let _ = tx.send(Completion::SearchFinished { generation, query, outcome });
                }
                _ = cancel_rx => {
                    call.abort();
                    debug!("Creator search for \"{}\" abandoned", query);
                }
            }
        });

        debug!("Creator search #{} started for \"{}\"", generation, text);
        self.in_flight = Some(InFlight {
            generation,
            query: text,
            cancel: cancel_tx,
        });
    }

    fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::DebounceElapsed { generation, text } => {
                let current = self.pending_debounce.as_ref().map(|p| p.generation);
                if current != Some(generation) {
                    debug!("Stale debounce for \"{}\" ignored", text);
                    return;
                }
                self.pending_debounce = None;
                self.execute_search(text);
            }
            Completion::SearchFinished {
                generation,
                query,
                outcome,
            } => {
                let current = self.in_flight.as_ref().map(|f| f.generation);
                if current != Some(generation) {
                    debug!("Superseded result for \"{}\" ignored", query);
                    return;
                }
                self.in_flight = None;

                match outcome {
                    Ok(payload) => {
                        let page = normalize_page(&payload);
                        debug!(
                            "Creator search for \"{}\": {} of {} (more: {})",
                            query,
                            page.creators.len(),
                            page.total_count,
                            page.has_more
                        );
                        self.set_state(SearchState::Success { query, page });
                    }
                    Err(e) => {
                        warn!("Creator search for \"{}\" failed: {}", query, e);
                        self.set_state(SearchState::Error {
                            query,
                            message: SEARCH_FAILED_MESSAGE.to_string(),
                        });
                    }
                }
            }
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.dispose();
    }
}
