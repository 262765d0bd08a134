//! Value and policy tables produced by the solver.
//!
//! Each solve owns one [`PolicyStore`] exclusively while it runs; once the
//! solve completes the tables are read-only and can be shared freely.

use std::collections::HashMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::solver::state::{Action, State};

/// Value and policy tables for one episode.
///
/// Every reachable state is finalized exactly once: its best achievable
/// value and the action achieving it are written together and never
/// updated. A second finalize of the same state means the exploration
/// bookkeeping was bypassed and is treated as a fatal logic error.
#[derive(Debug, Clone, Default)]
pub struct PolicyStore {
    /// Best achievable value per state.
    values: FxHashMap<State, u32>,

    /// Chosen action per state.
    actions: FxHashMap<State, Action>,
}

impl PolicyStore {
    /// Create new empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage with pre-allocated capacity.
    ///
    /// Use this when the reachable state count can be estimated up front to
    /// avoid rehashing while the solve runs.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            actions: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Record the final value and chosen action for a state.
    pub fn finalize(&mut self, state: State, value: u32, action: Action) {
        let previous = self.values.insert(state, value);
        debug_assert!(
            previous.is_none(),
            "state {} finalized twice",
            state.key()
        );
        self.actions.insert(state, action);
    }

    /// Whether a state has been finalized.
    pub fn contains(&self, state: &State) -> bool {
        self.values.contains_key(state)
    }

    /// The finalized value for a state, if any.
    pub fn value(&self, state: &State) -> Option<u32> {
        self.values.get(state).copied()
    }

    /// The finalized action for a state, if any.
    pub fn action(&self, state: &State) -> Option<Action> {
        self.actions.get(state).copied()
    }

    /// Number of finalized states.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no state has been finalized yet.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over all finalized states and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&State, u32)> {
        self.values.iter().map(|(state, &value)| (state, value))
    }

    /// Export the tables in serializable form, keyed by canonical state keys.
    pub fn export(&self) -> PolicyExport {
        let values = self
            .values
            .iter()
            .map(|(state, &value)| (state.key(), value))
            .collect();
        let actions = self
            .actions
            .iter()
            .map(|(state, action)| (state.key(), action.name().to_string()))
            .collect();
        PolicyExport { values, actions }
    }
}

/// Serializable snapshot of one episode's tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyExport {
    /// Best achievable value per state key.
    pub values: HashMap<String, u32>,

    /// Chosen action per state key, one of
    /// `"up"`, `"down"`, `"left"`, `"right"`, `"halt"`.
    pub actions: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::state::{Direction, Position};

    fn state_at(row: usize, col: usize) -> State {
        State::start(Position::new(row, col))
    }

    #[test]
    fn test_finalize_and_lookup() {
        let mut store = PolicyStore::new();
        assert!(store.is_empty());

        store.finalize(state_at(1, 1), 3, Action::Move(Direction::Left));
        store.finalize(state_at(2, 2), 0, Action::Halt);

        assert_eq!(store.len(), 2);
        assert!(store.contains(&state_at(1, 1)));
        assert_eq!(store.value(&state_at(1, 1)), Some(3));
        assert_eq!(store.action(&state_at(1, 1)), Some(Action::Move(Direction::Left)));
        assert_eq!(store.action(&state_at(2, 2)), Some(Action::Halt));
        assert_eq!(store.value(&state_at(0, 0)), None);
    }

    #[test]
    fn test_export_uses_canonical_keys() {
        let mut store = PolicyStore::new();
        store.finalize(state_at(2, 2), 5, Action::Halt);

        let export = store.export();
        assert_eq!(export.values.get("2,2,,"), Some(&5));
        assert_eq!(export.actions.get("2,2,,").map(String::as_str), Some("halt"));
    }
}
