//! State types for the episode solver.
//!
//! A solver state is a position plus the set of coins collected so far in
//! each class. States are keyed *pre-pickup*: the sets do not yet include
//! coins sitting at the state's own cell. Collection sets are canonical
//! bitmasks, so structurally equal states hash and compare identically with
//! no sorting step.

use std::fmt;

/// A (row, column) cell coordinate. Row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Row index, from the top.
    pub row: usize,
    /// Column index, from the left.
    pub col: usize,
}

impl Position {
    /// Create a position from row and column indices.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The four movement directions, in the solver's fixed evaluation order.
///
/// The order is load-bearing: equal-value moves are broken in favor of the
/// first direction in `Direction::ALL`, so reordering changes which of
/// several equally good policies is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// One row up.
    Up,
    /// One row down.
    Down,
    /// One column left.
    Left,
    /// One column right.
    Right,
}

impl Direction {
    /// All directions in evaluation order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Row and column deltas for a single step.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// Lower-case name, as used in exported policy tables.
    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An entry in the policy table: step in a direction, or end the episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Take a single step in the given direction.
    Move(Direction),
    /// End the episode at the current state.
    Halt,
}

impl Action {
    /// Lower-case name, as used in exported policy tables.
    pub fn name(self) -> &'static str {
        match self {
            Action::Move(dir) => dir.name(),
            Action::Halt => "halt",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of collected coin ids for one coin class, stored as a bitmask.
///
/// Ids are small integers assigned at parse time, so a 32-bit mask covers
/// every world the solver can realistically handle (the state space is
/// exponential in the coin count long before the mask runs out).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CoinSet(u32);

impl CoinSet {
    /// The empty set.
    pub const EMPTY: CoinSet = CoinSet(0);

    /// Largest number of coins one class may hold.
    pub const MAX_COINS: usize = 32;

    /// This set with `id` added.
    pub fn with(self, id: u8) -> CoinSet {
        debug_assert!((id as usize) < Self::MAX_COINS);
        CoinSet(self.0 | (1 << id))
    }

    /// Whether `id` is in the set.
    pub fn contains(self, id: u8) -> bool {
        self.0 & (1 << id) != 0
    }

    /// Whether every id of `other` is in this set.
    pub fn contains_all(self, other: CoinSet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether this set shares any id with `other`.
    pub fn intersects(self, other: CoinSet) -> bool {
        self.0 & other.0 != 0
    }

    /// Number of ids in the set.
    pub fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Whether the set is empty.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Ids in ascending order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..Self::MAX_COINS as u8).filter(move |&id| self.contains(id))
    }
}

impl fmt::Display for CoinSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for id in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{}", id)?;
            first = false;
        }
        Ok(())
    }
}

/// A solver state: position plus the coins collected in each class.
///
/// The sets are the state of the world *before* picking up anything at
/// `pos`; pickups happen when the state is expanded or replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct State {
    /// Current cell.
    pub pos: Position,
    /// Collected green coins.
    pub green: CoinSet,
    /// Collected red coins.
    pub red: CoinSet,
}

impl State {
    /// The start state of an episode: `pos` with nothing collected.
    pub fn start(pos: Position) -> State {
        State {
            pos,
            green: CoinSet::EMPTY,
            red: CoinSet::EMPTY,
        }
    }

    /// Canonical string key: `row,col,<green ids>,<red ids>`, ids ascending.
    ///
    /// Two semantically equal states always produce the same key; the key is
    /// what exported tables are indexed by.
    pub fn key(&self) -> String {
        format!(
            "{},{},{},{}",
            self.pos.row, self.pos.col, self.green, self.red
        )
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_set_operations() {
        let set = CoinSet::EMPTY.with(2).with(0).with(5);
        assert_eq!(set.len(), 3);
        assert!(set.contains(0));
        assert!(set.contains(2));
        assert!(set.contains(5));
        assert!(!set.contains(1));
        assert!(!set.is_empty());
        assert!(CoinSet::EMPTY.is_empty());

        // insertion is idempotent
        assert_eq!(set.with(2), set);

        let ids: Vec<u8> = set.iter().collect();
        assert_eq!(ids, vec![0, 2, 5], "ids iterate in ascending order");
        assert_eq!(set.to_string(), "0,2,5");
    }

    #[test]
    fn test_coin_set_relations() {
        let a = CoinSet::EMPTY.with(1).with(3);
        let b = CoinSet::EMPTY.with(1);
        assert!(a.contains_all(b));
        assert!(!b.contains_all(a));
        assert!(a.intersects(b));
        assert!(!a.intersects(CoinSet::EMPTY.with(0)));
        assert!(a.contains_all(CoinSet::EMPTY), "empty set is a subset of anything");
    }

    #[test]
    fn test_state_key_is_canonical() {
        let state = State {
            pos: Position::new(2, 3),
            green: CoinSet::EMPTY.with(2).with(0),
            red: CoinSet::EMPTY.with(1),
        };
        assert_eq!(state.key(), "2,3,0,2,1");

        // same sets built in a different insertion order encode identically
        let other = State {
            pos: Position::new(2, 3),
            green: CoinSet::EMPTY.with(0).with(2),
            red: CoinSet::EMPTY.with(1),
        };
        assert_eq!(state, other);
        assert_eq!(state.key(), other.key());
    }

    #[test]
    fn test_start_state_key_has_empty_sets() {
        let state = State::start(Position::new(2, 2));
        assert_eq!(state.key(), "2,2,,");
    }

    #[test]
    fn test_action_names() {
        assert_eq!(Action::Halt.name(), "halt");
        assert_eq!(Action::Move(Direction::Up).name(), "up");
        assert_eq!(Action::Move(Direction::Right).name(), "right");
        assert_eq!(
            Direction::ALL.map(|d| d.name()),
            ["up", "down", "left", "right"]
        );
    }
}
