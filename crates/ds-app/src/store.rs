use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info};

use ds_core::state::{reduce, Action, AppState};

const HISTORY_CAPACITY: usize = 64;

/// One applied transition, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionRecord {
    pub action: &'static str,
    pub from: &'static str,
    pub to: &'static str,
    pub at: DateTime<Utc>,
}

/// Result of a dispatch.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// The reducer produced a new state.
    Applied(Arc<AppState>),
    /// The action did not apply; the state is unchanged (same `Arc`).
    Ignored(Arc<AppState>),
}

impl DispatchOutcome {
    pub fn state(&self) -> &Arc<AppState> {
        match self {
            DispatchOutcome::Applied(state) | DispatchOutcome::Ignored(state) => state,
        }
    }

    pub fn into_state(self) -> Arc<AppState> {
        match self {
            DispatchOutcome::Applied(state) | DispatchOutcome::Ignored(state) => state,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, DispatchOutcome::Applied(_))
    }
}

/// Single-writer application state store.
///
/// Only [`StateStore::dispatch`], [`StateStore::dispatch_if`] and the
/// boot-time [`StateStore::reset`] mutate the state; everything else reads
/// snapshots or subscribes.
/// Dispatch is synchronous: the reducer runs inside the watch channel's
/// write lock, so concurrent dispatches are serialized.
///
/// 单写者状态存储。
pub struct StateStore {
    tx: watch::Sender<Arc<AppState>>,
    history: Mutex<VecDeque<TransitionRecord>>,
}

impl StateStore {
    pub fn new(initial: AppState) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self {
            tx,
            history: Mutex::new(VecDeque::with_capacity(HISTORY_CAPACITY)),
        }
    }

    /// Returns the store wrapped in Arc for shared ownership.
    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Current state snapshot.
    pub fn snapshot(&self) -> Arc<AppState> {
        Arc::clone(&self.tx.borrow())
    }

    /// Receiver notified on every applied transition.
    pub fn subscribe(&self) -> watch::Receiver<Arc<AppState>> {
        self.tx.subscribe()
    }

    /// Apply `action` through the reducer.
    ///
    /// Inapplicable actions are logged and ignored, never an error.
    pub fn dispatch(&self, action: &Action) -> DispatchOutcome {
        match self.apply(action, |_| true) {
            Some(outcome) => outcome,
            None => DispatchOutcome::Ignored(self.snapshot()),
        }
    }

    /// Apply `action` only if `guard` accepts the current state.
    ///
    /// The guard runs under the same write lock as the reducer, so nothing can
    /// be dispatched between the check and the transition. Returns `None` when
    /// the guard rejects.
    pub fn dispatch_if(
        &self,
        action: &Action,
        guard: impl FnOnce(&AppState) -> bool,
    ) -> Option<DispatchOutcome> {
        self.apply(action, guard)
    }

    fn apply(
        &self,
        action: &Action,
        guard: impl FnOnce(&AppState) -> bool,
    ) -> Option<DispatchOutcome> {
        let mut accepted = false;
        let mut from = None;
        let mut result = None;
        self.tx.send_if_modified(|current| {
            if !guard(&**current) {
                return false;
            }
            accepted = true;
            let next = reduce(current, action);
            result = Some(Arc::clone(&next));
            if Arc::ptr_eq(current, &next) {
                return false;
            }
            from = Some(current.name());
            *current = next;
            true
        });

        if !accepted {
            return None;
        }
        let state = result.unwrap_or_else(|| self.snapshot());
        let outcome = match from {
            Some(from) => {
                info!(from, to = state.name(), action = action.name(), "app state transition");
                self.record(TransitionRecord {
                    action: action.name(),
                    from,
                    to: state.name(),
                    at: Utc::now(),
                });
                DispatchOutcome::Applied(state)
            }
            None => {
                debug!(
                    state = state.name(),
                    action = action.name(),
                    "action ignored for current state"
                );
                DispatchOutcome::Ignored(state)
            }
        };
        Some(outcome)
    }

    /// Replace the state wholesale. Used for process boot only.
    pub fn reset(&self, state: AppState) -> Arc<AppState> {
        let state = Arc::new(state);
        let previous = self.tx.send_replace(Arc::clone(&state));
        info!(from = previous.name(), to = state.name(), "app state reset");
        self.record(TransitionRecord {
            action: "BOOT",
            from: previous.name(),
            to: state.name(),
            at: Utc::now(),
        });
        state
    }

    /// Most recent transitions, oldest first.
    pub fn history(&self) -> Vec<TransitionRecord> {
        match self.history.lock() {
            Ok(history) => history.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    fn record(&self, record: TransitionRecord) {
        let mut history = match self.history.lock() {
            Ok(history) => history,
            Err(poisoned) => poisoned.into_inner(),
        };
        if history.len() == HISTORY_CAPACITY {
            history.pop_front();
        }
        history.push_back(record);
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(AppState::boot())
    }
}
