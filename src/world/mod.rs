//! Grid world model: cells, coins, doors and the transition function.
//!
//! A world is parsed once from a rectangular block of text and never mutated.
//! The text alphabet:
//!
//! | char | meaning                          |
//! |------|----------------------------------|
//! | `.`  | floor                            |
//! | `#`  | wall                             |
//! | `D`  | door (conditionally passable)    |
//! | `g`  | green coin                       |
//! | `r`  | red coin                         |
//! | `S`  | start position (exactly one)     |
//!
//! Coin ids are assigned in row-major order of first appearance, separately
//! per class. A door is open iff every green coin in its watch row has been
//! collected and no red coin in that row has been collected; the watch row
//! is the row directly below the door.

use std::fmt;

use crate::solver::state::{CoinSet, Direction, Position};

/// One cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Freely passable.
    Floor,
    /// Never passable.
    Wall,
    /// Conditionally passable; the payload indexes into [`World::doors`].
    Door(usize),
}

/// A collectible coin with a class-local id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coin {
    /// The cell the coin sits on.
    pub pos: Position,
    /// Id unique within the coin's class, assigned in row-major parse order.
    pub id: u8,
}

/// A conditionally passable cell.
///
/// Openness is a pure function of the current collection sets and is
/// recomputed on every check; doors carry no state of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Door {
    /// The cell the door occupies.
    pub pos: Position,

    /// Row whose coins control this door, the row directly below it.
    ///
    /// Kept as an explicit field rather than derived from the direction of
    /// travel: which coins a door watches is world content, not geometry.
    pub watch_row: usize,

    /// Green coins in the watch row; all must be collected for the door to
    /// open.
    pub green_required: CoinSet,

    /// Red coins in the watch row; collecting any keeps the door shut.
    pub red_forbidden: CoinSet,
}

impl Door {
    /// Whether the door is open for the given collection sets.
    pub fn is_open(&self, green: CoinSet, red: CoinSet) -> bool {
        green.contains_all(self.green_required) && !red.intersects(self.red_forbidden)
    }
}

/// Errors from parsing grid text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input had no rows.
    Empty,
    /// A row's length differed from the first row's.
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Its length.
        len: usize,
        /// The expected length.
        expected: usize,
    },
    /// A character outside the grid alphabet.
    UnknownCell {
        /// Row of the offending character.
        row: usize,
        /// Column of the offending character.
        col: usize,
        /// The character found.
        found: char,
    },
    /// No `S` cell was present.
    MissingStart,
    /// More than one `S` cell was present.
    DuplicateStart {
        /// The first start cell encountered.
        first: Position,
        /// The second start cell encountered.
        second: Position,
    },
    /// One coin class exceeded the collection-set capacity.
    TooManyCoins {
        /// `"green"` or `"red"`.
        class: &'static str,
        /// The capacity that was exceeded.
        limit: usize,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "grid text has no rows"),
            ParseError::RaggedRow { row, len, expected } => write!(
                f,
                "row {} has length {}, expected {}",
                row, len, expected
            ),
            ParseError::UnknownCell { row, col, found } => write!(
                f,
                "unknown cell character {:?} at ({}, {})",
                found, row, col
            ),
            ParseError::MissingStart => write!(f, "grid has no start cell 'S'"),
            ParseError::DuplicateStart { first, second } => write!(
                f,
                "grid has more than one start cell: {} and {}",
                first, second
            ),
            ParseError::TooManyCoins { class, limit } => {
                write!(f, "more than {} {} coins", limit, class)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// An immutable rectangular grid world.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    start: Position,
    green_coins: Vec<Coin>,
    red_coins: Vec<Coin>,
    doors: Vec<Door>,
}

impl World {
    /// Parse a rectangular block of grid text.
    ///
    /// Fails on ragged rows, characters outside the alphabet, zero or
    /// multiple start cells, or more coins of one class than a collection
    /// set can hold. The start cell becomes floor; coin cells are floor with
    /// the coin recorded separately.
    pub fn parse(text: &str) -> Result<World, ParseError> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.is_empty() || lines[0].is_empty() {
            return Err(ParseError::Empty);
        }
        let rows = lines.len();
        let cols = lines[0].chars().count();

        let mut cells = Vec::with_capacity(rows * cols);
        let mut start: Option<Position> = None;
        let mut green_coins = Vec::new();
        let mut red_coins = Vec::new();
        let mut door_cells = Vec::new();

        for (row, line) in lines.iter().enumerate() {
            let len = line.chars().count();
            if len != cols {
                return Err(ParseError::RaggedRow {
                    row,
                    len,
                    expected: cols,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let pos = Position::new(row, col);
                let cell = match ch {
                    '.' => Cell::Floor,
                    '#' => Cell::Wall,
                    'S' => {
                        if let Some(first) = start {
                            return Err(ParseError::DuplicateStart { first, second: pos });
                        }
                        start = Some(pos);
                        Cell::Floor
                    }
                    'g' => {
                        green_coins.push(Coin {
                            pos,
                            id: green_coins.len() as u8,
                        });
                        Cell::Floor
                    }
                    'r' => {
                        red_coins.push(Coin {
                            pos,
                            id: red_coins.len() as u8,
                        });
                        Cell::Floor
                    }
                    'D' => {
                        door_cells.push(pos);
                        Cell::Door(door_cells.len() - 1)
                    }
                    found => return Err(ParseError::UnknownCell { row, col, found }),
                };
                cells.push(cell);
            }
        }

        if green_coins.len() > CoinSet::MAX_COINS {
            return Err(ParseError::TooManyCoins {
                class: "green",
                limit: CoinSet::MAX_COINS,
            });
        }
        if red_coins.len() > CoinSet::MAX_COINS {
            return Err(ParseError::TooManyCoins {
                class: "red",
                limit: CoinSet::MAX_COINS,
            });
        }
        let start = start.ok_or(ParseError::MissingStart)?;

        // Precompute each door's watch-row masks so the openness check is a
        // pair of bit operations instead of a coin scan.
        let doors = door_cells
            .into_iter()
            .map(|pos| {
                let watch_row = pos.row + 1;
                let green_required = green_coins
                    .iter()
                    .filter(|coin| coin.pos.row == watch_row)
                    .fold(CoinSet::EMPTY, |set, coin| set.with(coin.id));
                let red_forbidden = red_coins
                    .iter()
                    .filter(|coin| coin.pos.row == watch_row)
                    .fold(CoinSet::EMPTY, |set, coin| set.with(coin.id));
                Door {
                    pos,
                    watch_row,
                    green_required,
                    red_forbidden,
                }
            })
            .collect();

        Ok(World {
            rows,
            cols,
            cells,
            start,
            green_coins,
            red_coins,
            doors,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The episode's start position.
    pub fn start(&self) -> Position {
        self.start
    }

    /// The cell at `pos`. `pos` must be in bounds.
    pub fn cell(&self, pos: Position) -> Cell {
        self.cells[pos.row * self.cols + pos.col]
    }

    /// All green coins, in id order.
    pub fn green_coins(&self) -> &[Coin] {
        &self.green_coins
    }

    /// All red coins, in id order.
    pub fn red_coins(&self) -> &[Coin] {
        &self.red_coins
    }

    /// All doors, in the order their cells appear row-major.
    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    /// The pass condition: every green coin collected, no red coin collected.
    pub fn passes(&self, green: CoinSet, red: CoinSet) -> bool {
        self.green_coins.iter().all(|coin| green.contains(coin.id))
            && self.red_coins.iter().all(|coin| !red.contains(coin.id))
    }

    /// Collection sets after picking up whatever sits at `pos`, plus the
    /// number of coins newly collected. Picking up is idempotent: coins
    /// already in the sets contribute nothing.
    pub fn pickups(&self, pos: Position, green: CoinSet, red: CoinSet) -> (CoinSet, CoinSet, u32) {
        let mut new_green = green;
        let mut new_red = red;
        let mut picked = 0;
        for coin in &self.green_coins {
            if coin.pos == pos && !new_green.contains(coin.id) {
                new_green = new_green.with(coin.id);
                picked += 1;
            }
        }
        for coin in &self.red_coins {
            if coin.pos == pos && !new_red.contains(coin.id) {
                new_red = new_red.with(coin.id);
                picked += 1;
            }
        }
        (new_green, new_red, picked)
    }

    /// The cell one step from `pos` in `dir`, if it stays in bounds.
    pub fn step(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (dr, dc) = dir.delta();
        let row = pos.row.checked_add_signed(dr)?;
        let col = pos.col.checked_add_signed(dc)?;
        (row < self.rows && col < self.cols).then_some(Position::new(row, col))
    }

    /// Legal single-step moves out of `pos`, in evaluation order.
    ///
    /// Callers pass the collection sets *after* pickups at `pos`: a door's
    /// openness sees the entering step's pickups, not the pre-pickup state.
    pub fn legal_moves(&self, pos: Position, green: CoinSet, red: CoinSet) -> Vec<(Direction, Position)> {
        let mut moves = Vec::with_capacity(4);
        for dir in Direction::ALL {
            if let Some(next) = self.step(pos, dir) {
                if self.passable(next, green, red) {
                    moves.push((dir, next));
                }
            }
        }
        moves
    }

    fn passable(&self, pos: Position, green: CoinSet, red: CoinSet) -> bool {
        match self.cell(pos) {
            Cell::Floor => true,
            Cell::Wall => false,
            Cell::Door(index) => self.doors[index].is_open(green, red),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "#####\n#g.r#\n#.S.#\n#####";

    #[test]
    fn test_parse_small_grid() {
        let world = World::parse(SMALL).expect("grid parses");
        assert_eq!(world.rows(), 4);
        assert_eq!(world.cols(), 5);
        assert_eq!(world.start(), Position::new(2, 2));
        // start cell is floor after parsing
        assert_eq!(world.cell(Position::new(2, 2)), Cell::Floor);
        assert_eq!(world.green_coins(), &[Coin { pos: Position::new(1, 1), id: 0 }]);
        assert_eq!(world.red_coins(), &[Coin { pos: Position::new(1, 3), id: 0 }]);
        assert!(world.doors().is_empty());
    }

    #[test]
    fn test_coin_ids_are_row_major_per_class() {
        let world = World::parse(".gg.S\ng.r.g").expect("grid parses");
        let green: Vec<(usize, usize, u8)> = world
            .green_coins()
            .iter()
            .map(|c| (c.pos.row, c.pos.col, c.id))
            .collect();
        assert_eq!(green, vec![(0, 1, 0), (0, 2, 1), (1, 0, 2), (1, 4, 3)]);
        assert_eq!(world.red_coins().len(), 1);
        assert_eq!(world.red_coins()[0].id, 0);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(World::parse(""), Err(ParseError::Empty));
        assert_eq!(
            World::parse("S#\n###"),
            Err(ParseError::RaggedRow { row: 1, len: 3, expected: 2 })
        );
        assert_eq!(World::parse("..."), Err(ParseError::MissingStart));
        assert_eq!(
            World::parse("SS"),
            Err(ParseError::DuplicateStart {
                first: Position::new(0, 0),
                second: Position::new(0, 1),
            })
        );
        assert_eq!(
            World::parse("S?"),
            Err(ParseError::UnknownCell { row: 0, col: 1, found: '?' })
        );
    }

    #[test]
    fn test_door_watch_row_masks() {
        let world = World::parse("..D..\n.g.r.\n..S..").expect("grid parses");
        let door = world.doors()[0];
        assert_eq!(door.pos, Position::new(0, 2));
        assert_eq!(door.watch_row, 1);
        assert_eq!(door.green_required, CoinSet::EMPTY.with(0));
        assert_eq!(door.red_forbidden, CoinSet::EMPTY.with(0));

        assert!(!door.is_open(CoinSet::EMPTY, CoinSet::EMPTY));
        assert!(door.is_open(CoinSet::EMPTY.with(0), CoinSet::EMPTY));
        assert!(!door.is_open(CoinSet::EMPTY.with(0), CoinSet::EMPTY.with(0)));
    }

    #[test]
    fn test_door_with_empty_watch_row_is_always_open() {
        // watch row is below the grid: nothing to require, nothing to forbid
        let world = World::parse("S.D").expect("grid parses");
        let door = world.doors()[0];
        assert!(door.is_open(CoinSet::EMPTY, CoinSet::EMPTY));
        let moves = world.legal_moves(Position::new(0, 1), CoinSet::EMPTY, CoinSet::EMPTY);
        assert!(moves.contains(&(Direction::Right, Position::new(0, 2))));
    }

    #[test]
    fn test_legal_moves_walls_and_bounds() {
        let world = World::parse(SMALL).expect("grid parses");
        let moves = world.legal_moves(world.start(), CoinSet::EMPTY, CoinSet::EMPTY);
        assert_eq!(
            moves,
            vec![
                (Direction::Up, Position::new(1, 2)),
                (Direction::Left, Position::new(2, 1)),
                (Direction::Right, Position::new(2, 3)),
            ],
            "down is a wall; order follows direction priority"
        );

        // open-bordered grid: out-of-bounds candidates are discarded
        let open = World::parse("S.\n..").expect("grid parses");
        let corner = open.legal_moves(Position::new(0, 0), CoinSet::EMPTY, CoinSet::EMPTY);
        assert_eq!(
            corner,
            vec![
                (Direction::Down, Position::new(1, 0)),
                (Direction::Right, Position::new(0, 1)),
            ]
        );
    }

    #[test]
    fn test_door_sees_entering_pickups() {
        // door above a green coin that sits right next to the start
        let world = World::parse("#D#\n#g#\n#S#").expect("grid parses");
        let coin_cell = Position::new(1, 1);

        // before the coin is collected the door is shut
        let shut = world.legal_moves(coin_cell, CoinSet::EMPTY, CoinSet::EMPTY);
        assert!(!shut.iter().any(|&(dir, _)| dir == Direction::Up));

        // with the post-pickup sets the same move is legal
        let (green, red, picked) = world.pickups(coin_cell, CoinSet::EMPTY, CoinSet::EMPTY);
        assert_eq!(picked, 1);
        let open = world.legal_moves(coin_cell, green, red);
        assert!(open.iter().any(|&(dir, _)| dir == Direction::Up));
    }

    #[test]
    fn test_pickups_are_idempotent() {
        let world = World::parse(SMALL).expect("grid parses");
        let coin_cell = Position::new(1, 1);
        let (green, red, picked) = world.pickups(coin_cell, CoinSet::EMPTY, CoinSet::EMPTY);
        assert_eq!(picked, 1);
        assert!(green.contains(0));
        assert!(red.is_empty());

        let (again_green, again_red, again) = world.pickups(coin_cell, green, red);
        assert_eq!(again, 0);
        assert_eq!(again_green, green);
        assert_eq!(again_red, red);
    }

    #[test]
    fn test_pass_condition() {
        let world = World::parse(SMALL).expect("grid parses");
        assert!(!world.passes(CoinSet::EMPTY, CoinSet::EMPTY), "green coin missing");
        assert!(world.passes(CoinSet::EMPTY.with(0), CoinSet::EMPTY));
        assert!(!world.passes(CoinSet::EMPTY.with(0), CoinSet::EMPTY.with(0)), "red coin collected");
    }
}
