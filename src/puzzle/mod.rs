// vim: set ai et ts=4 sw=4 sts=4:
mod solver;

use std::cmp::min;
use std::convert::TryFrom;
use std::fmt;
use yaml_rust::Yaml;

use super::grid::{CellGrid, CellState, GridError};
use super::util::{Direction, Direction::*};

pub use self::solver::{PuzzleSolveStep, Solver};

#[derive(PartialEq, Debug, Clone)]
pub enum PuzzleError {
    InvalidDimension { num_cols: usize, num_rows: usize },
    InvalidShipLength { length: usize },
    InvalidConstraintSpec(String),
    GridSizeMismatch { which: &'static str },
    PlacementCollision { col: usize, row: usize },
    PlacementOutOfBounds { length: usize, col: usize, row: usize, direction: Direction },
    KnownSolutionConflict { col: usize, row: usize },
    KnownCellImmutable { col: usize, row: usize },
    NoSolution,
    Grid(GridError),
}
impl From<GridError> for PuzzleError {
    fn from(other: GridError) -> Self {
        PuzzleError::Grid(other)
    }
}
impl fmt::Display for PuzzleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PuzzleError: {}", match self {
            PuzzleError::InvalidDimension { num_cols, num_rows } =>
                format!("number of columns and rows must be > 0, got {}x{}", num_cols, num_rows),
            PuzzleError::InvalidShipLength { length } =>
                format!("ship lengths must be > 0, got {}", length),
            PuzzleError::InvalidConstraintSpec(msg) =>
                msg.clone(),
            PuzzleError::GridSizeMismatch { which } =>
                format!("{} has non matching size", which),
            PuzzleError::PlacementCollision { col, row } =>
                format!("solution_ships invalid: cell at {}, {}", col, row),
            PuzzleError::PlacementOutOfBounds { length, col, row, direction } =>
                format!("ship of length {} at (col={}, row={}, {}) does not fit in the grid",
                        length, col, row, direction),
            PuzzleError::KnownSolutionConflict { col, row } =>
                format!("known_grid does not match solution_grid at cell {}, {}", col, row),
            PuzzleError::KnownCellImmutable { col, row } =>
                format!("cell (col={}, row={}) is fixed by the known grid", col, row),
            PuzzleError::NoSolution =>
                "puzzle has no solution attached".to_string(),
            PuzzleError::Grid(err) =>
                err.to_string(),
        })
    }
}

// ------------------------------------------------

/// A battleships puzzle: the grid dimensions, the fleet, the occupied-cell
/// target of every row and column, the cells known up front, and the current
/// working state. When built from an explicit ship placement the derived
/// solution grid is carried along and the targets are computed from it.
///
/// The current state must agree with the known cells but is otherwise free to
/// be wrong; `is_incorrect` compares it against the solution when one exists.
#[derive(PartialEq, Debug, Clone)]
pub struct Puzzle {
    num_cols: usize,
    num_rows: usize,
    ship_lengths: Vec<usize>,
    col_sums: Vec<usize>,
    row_sums: Vec<usize>,
    known_grid: CellGrid,
    curr_grid: CellGrid,
    solution_grid: Option<CellGrid>,
    solution_ships: Option<Vec<(usize, usize, Direction)>>,
}

impl Puzzle {
    /// Creates a fully validated puzzle. Exactly one of {`col_sums` and
    /// `row_sums`, `solution_ships`} must be given; when the solution is
    /// given the sums are derived from it. `known_grid` defaults to all
    /// unknown, `curr_grid` to a copy of `known_grid`.
    pub fn new(num_cols: usize,
               num_rows: usize,
               ship_lengths: Vec<usize>,
               col_sums: Option<Vec<usize>>,
               row_sums: Option<Vec<usize>>,
               known_grid: Option<CellGrid>,
               curr_grid: Option<CellGrid>,
               solution_ships: Option<Vec<(usize, usize, Direction)>>)
        -> Result<Puzzle, PuzzleError>
    {
        if num_cols < 1 || num_rows < 1 {
            return Err(PuzzleError::InvalidDimension { num_cols, num_rows });
        }
        if let Some(&length) = ship_lengths.iter().find(|&&length| length < 1) {
            return Err(PuzzleError::InvalidShipLength { length });
        }

        let known_grid = match known_grid {
            Some(grid) => grid,
            None       => CellGrid::new(num_cols, num_rows)?,
        };
        let curr_grid = match curr_grid {
            Some(grid) => grid,
            None       => known_grid.clone(),
        };
        if known_grid.num_cols() != num_cols || known_grid.num_rows() != num_rows {
            return Err(PuzzleError::GridSizeMismatch { which: "known_grid" });
        }
        if curr_grid.num_cols() != num_cols || curr_grid.num_rows() != num_rows {
            return Err(PuzzleError::GridSizeMismatch { which: "curr_grid" });
        }
        if col_sums.is_some() == solution_ships.is_some() {
            return Err(PuzzleError::InvalidConstraintSpec(
                "one of [col_sums, solution_ships] must be set".to_string()));
        }
        if row_sums.is_some() == solution_ships.is_some() {
            return Err(PuzzleError::InvalidConstraintSpec(
                "one of [row_sums, solution_ships] must be set".to_string()));
        }
        if let Some(ships) = &solution_ships {
            if ships.len() != ship_lengths.len() {
                return Err(PuzzleError::InvalidConstraintSpec(
                    "solution_ships has non matching size".to_string()));
            }
        }
        if let Some(sums) = &col_sums {
            if sums.len() != num_cols {
                return Err(PuzzleError::InvalidConstraintSpec(
                    "col_sums has non matching size".to_string()));
            }
            if sums.iter().any(|&sum| sum > num_rows) {
                return Err(PuzzleError::InvalidConstraintSpec(
                    "col_sums values must be at most the column length".to_string()));
            }
        }
        if let Some(sums) = &row_sums {
            if sums.len() != num_rows {
                return Err(PuzzleError::InvalidConstraintSpec(
                    "row_sums has non matching size".to_string()));
            }
            if sums.iter().any(|&sum| sum > num_cols) {
                return Err(PuzzleError::InvalidConstraintSpec(
                    "row_sums values must be at most the row length".to_string()));
            }
        }

        let mut puzzle = Puzzle {
            num_cols,
            num_rows,
            ship_lengths,
            col_sums: col_sums.unwrap_or_default(),
            row_sums: row_sums.unwrap_or_default(),
            known_grid,
            curr_grid,
            solution_grid: None,
            solution_ships: None,
        };

        if let Some(ships) = solution_ships {
            let solution_grid = puzzle.derive_solution_grid(&ships)?;
            puzzle.col_sums = (0..num_cols)
                .map(|c| (0..num_rows).filter(|&r| solution_grid.state(c, r).is_occupied()).count())
                .collect();
            puzzle.row_sums = (0..num_rows)
                .map(|r| (0..num_cols).filter(|&c| solution_grid.state(c, r).is_occupied()).count())
                .collect();

            for c in 0..num_cols {
                for r in 0..num_rows {
                    let known = puzzle.known_grid.state(c, r);
                    if !known.is_unknown() && known != solution_grid.state(c, r) {
                        return Err(PuzzleError::KnownSolutionConflict { col: c, row: r });
                    }
                }
            }
            puzzle.solution_grid = Some(solution_grid);
            puzzle.solution_ships = Some(ships);
        }

        Ok(puzzle)
    }

    pub fn from_sums(num_cols: usize,
                     num_rows: usize,
                     ship_lengths: Vec<usize>,
                     col_sums: Vec<usize>,
                     row_sums: Vec<usize>,
                     known_grid: Option<CellGrid>)
        -> Result<Puzzle, PuzzleError>
    {
        Puzzle::new(num_cols, num_rows, ship_lengths,
                    Some(col_sums), Some(row_sums), known_grid, None, None)
    }

    pub fn from_solution(num_cols: usize,
                         num_rows: usize,
                         ship_lengths: Vec<usize>,
                         solution_ships: Vec<(usize, usize, Direction)>,
                         known_grid: Option<CellGrid>)
        -> Result<Puzzle, PuzzleError>
    {
        Puzzle::new(num_cols, num_rows, ship_lengths,
                    None, None, known_grid, None, Some(solution_ships))
    }

    // Places every ship of `ships` into a fresh grid, rejecting placements
    // that leave the grid or occupy/touch an already occupied cell, then
    // fills the rest with water. The compare-and-set on the water fill
    // re-checks that no ship cell gets overwritten.
    fn derive_solution_grid(&self, ships: &[(usize, usize, Direction)])
        -> Result<CellGrid, PuzzleError>
    {
        let mut grid = CellGrid::new(self.num_cols, self.num_rows)?;

        for (&ship_length, &(start_c, start_r, direction)) in self.ship_lengths.iter().zip(ships) {
            let cells = self.get_ship_cells(ship_length, start_c, start_r, direction)?;
            for &(c, r) in &self.get_ship_all_cells(ship_length, start_c, start_r, direction) {
                if grid.state(c, r).is_occupied() {
                    return Err(PuzzleError::PlacementCollision { col: c, row: r });
                }
            }

            if ship_length == 1 {
                grid.set(start_c, start_r, CellState::OccupiedWhole, None)?;
            } else {
                let (start_marker, end_marker) = match direction {
                    Horizontal => (CellState::OccupiedEndLeft, CellState::OccupiedEndRight),
                    Vertical   => (CellState::OccupiedEndUp, CellState::OccupiedEndDown),
                };
                let (first_c, first_r) = cells[0];
                let (last_c, last_r) = cells[cells.len() - 1];
                grid.set(first_c, first_r, start_marker, None)?;
                for &(c, r) in &cells[1..cells.len() - 1] {
                    grid.set(c, r, CellState::OccupiedMid, None)?;
                }
                grid.set(last_c, last_r, end_marker, None)?;
            }
        }

        for c in 0..self.num_cols {
            for r in 0..self.num_rows {
                grid.set(c, r, CellState::Water, Some(CellState::Unknown))?;
            }
        }
        Ok(grid)
    }

    pub fn num_cols(&self) -> usize { self.num_cols }
    pub fn num_rows(&self) -> usize { self.num_rows }
    pub fn ship_lengths(&self) -> &[usize] { &self.ship_lengths }
    pub fn col_sums(&self) -> &[usize] { &self.col_sums }
    pub fn row_sums(&self) -> &[usize] { &self.row_sums }

    /// Target number of occupied cells in the given column.
    pub fn get_col_sum(&self, c: usize) -> usize {
        self.col_sums[c]
    }
    /// Target number of occupied cells in the given row.
    pub fn get_row_sum(&self, r: usize) -> usize {
        self.row_sums[r]
    }

    pub fn has_solution(&self) -> bool {
        self.solution_grid.is_some()
    }

    /// Visible state of the specified cell.
    pub fn get_cell(&self, c: usize, r: usize) -> Result<CellState, PuzzleError> {
        Ok(self.curr_grid.get(c, r)?)
    }

    /// Solution state of the specified cell; fails when the puzzle was built
    /// from sums only.
    pub fn get_solution_cell(&self, c: usize, r: usize) -> Result<CellState, PuzzleError> {
        match &self.solution_grid {
            Some(grid) => Ok(grid.get(c, r)?),
            None       => Err(PuzzleError::NoSolution),
        }
    }

    /// True iff the cell was fixed before solving began and cannot be changed.
    pub fn is_cell_known(&self, c: usize, r: usize) -> Result<bool, PuzzleError> {
        Ok(!self.known_grid.get(c, r)?.is_unknown())
    }

    // unchecked read for callers that iterate within the puzzle's dimensions
    pub(crate) fn cell(&self, c: usize, r: usize) -> CellState {
        self.curr_grid.state(c, r)
    }

    pub fn get_row_occupied_sum(&self, r: usize) -> usize {
        (0..self.num_cols).filter(|&c| self.cell(c, r).is_occupied()).count()
    }
    pub fn get_col_occupied_sum(&self, c: usize) -> usize {
        (0..self.num_rows).filter(|&r| self.cell(c, r).is_occupied()).count()
    }
    pub fn get_row_water_sum(&self, r: usize) -> usize {
        (0..self.num_cols).filter(|&c| self.cell(c, r).is_water()).count()
    }
    pub fn get_col_water_sum(&self, c: usize) -> usize {
        (0..self.num_rows).filter(|&r| self.cell(c, r).is_water()).count()
    }

    /// True iff no line exceeds its target in either direction: occupied
    /// count stays within the target, and water count stays within the line
    /// length minus the target.
    pub fn is_valid(&self) -> bool {
        if (0..self.num_rows).any(|r| self.get_row_occupied_sum(r) > self.row_sums[r]) {
            return false;
        }
        if (0..self.num_cols).any(|c| self.get_col_occupied_sum(c) > self.col_sums[c]) {
            return false;
        }
        if (0..self.num_rows).any(|r| self.get_row_water_sum(r) > self.num_cols - self.row_sums[r]) {
            return false;
        }
        if (0..self.num_cols).any(|c| self.get_col_water_sum(c) > self.num_rows - self.col_sums[c]) {
            return false;
        }
        true
    }

    /// True iff a solution is attached and any current cell contradicts it.
    /// Only the occupied/water dichotomy is compared, so an occupied cell
    /// whose exact ship part is still ambiguous never counts as incorrect.
    pub fn is_incorrect(&self) -> bool {
        let solution_grid = match &self.solution_grid {
            Some(grid) => grid,
            None       => return false,
        };
        for c in 0..self.num_cols {
            for r in 0..self.num_rows {
                let curr_state = self.cell(c, r);
                if curr_state.is_occupied() {
                    if !solution_grid.state(c, r).is_occupied() {
                        return true;
                    }
                } else if curr_state.is_water() {
                    if !solution_grid.state(c, r).is_water() {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// True iff valid, not incorrect, and every cell has been resolved to
    /// water or a specific ship part.
    pub fn is_solved(&self) -> bool {
        if !self.is_valid() || self.is_incorrect() {
            return false;
        }
        for c in 0..self.num_cols {
            for r in 0..self.num_rows {
                let state = self.cell(c, r);
                if state.is_unknown() || state == CellState::OccupiedUnknown {
                    return false;
                }
            }
        }
        true
    }

    /// Sets the state of the specified cell in the current grid. Cells fixed
    /// by the known grid cannot be changed, with one exception: a cell known
    /// to be occupied-but-unspecified may be refined to any occupied variant.
    pub fn set_cell(&mut self, c: usize, r: usize, state: CellState) -> Result<(), PuzzleError> {
        let known = self.known_grid.get(c, r)?;
        if known == CellState::OccupiedUnknown {
            if !state.is_occupied() {
                return Err(PuzzleError::KnownCellImmutable { col: c, row: r });
            }
        } else if !known.is_unknown() {
            return Err(PuzzleError::KnownCellImmutable { col: c, row: r });
        }
        self.curr_grid.set(c, r, state, None)?;
        Ok(())
    }

    /// The (up to) 9 cells around and including the given cell.
    pub fn get_neighbour_cells(&self, c: usize, r: usize) -> Vec<(usize, usize)> {
        let min_c = c.saturating_sub(1);
        let max_c = min(c + 1, self.num_cols - 1);
        let min_r = r.saturating_sub(1);
        let max_r = min(r + 1, self.num_rows - 1);

        let mut cells = Vec::new();
        for cn in min_c..=max_c {
            for rn in min_r..=max_r {
                cells.push((cn, rn));
            }
        }
        cells
    }

    /// The (up to) 4 directly adjacent cells around the given cell.
    pub fn get_nondiagonal_neighbour_cells(&self, c: usize, r: usize) -> Vec<(usize, usize)> {
        let (c, r) = (c as isize, r as isize);
        self.strip_out_of_bound_cells(&[(c + 1, r), (c - 1, r), (c, r + 1), (c, r - 1)])
    }

    /// The (up to) 4 diagonally adjacent cells around the given cell.
    pub fn get_diagonal_neighbour_cells(&self, c: usize, r: usize) -> Vec<(usize, usize)> {
        let (c, r) = (c as isize, r as isize);
        self.strip_out_of_bound_cells(&[(c - 1, r - 1), (c - 1, r + 1), (c + 1, r - 1), (c + 1, r + 1)])
    }

    /// Drops any candidate coordinates that fall outside the grid.
    pub fn strip_out_of_bound_cells(&self, cells: &[(isize, isize)]) -> Vec<(usize, usize)> {
        cells.iter()
             .filter(|&&(c, r)| 0 <= c && (c as usize) < self.num_cols
                             && 0 <= r && (r as usize) < self.num_rows)
             .map(|&(c, r)| (c as usize, r as usize))
             .collect()
    }

    /// The cells a ship of the given length and origin would occupy.
    pub fn get_ship_cells(&self, ship_length: usize, start_c: usize, start_r: usize,
                          direction: Direction) -> Result<Vec<(usize, usize)>, PuzzleError>
    {
        let out_of_bounds = PuzzleError::PlacementOutOfBounds {
            length: ship_length, col: start_c, row: start_r, direction,
        };
        if start_c >= self.num_cols || start_r >= self.num_rows {
            return Err(out_of_bounds);
        }
        match direction {
            Horizontal => {
                if start_c + ship_length > self.num_cols {
                    return Err(out_of_bounds);
                }
                Ok((0..ship_length).map(|d| (start_c + d, start_r)).collect())
            }
            Vertical => {
                if start_r + ship_length > self.num_rows {
                    return Err(out_of_bounds);
                }
                Ok((0..ship_length).map(|d| (start_c, start_r + d)).collect())
            }
        }
    }

    /// The cells adjacent to such a ship, the ship itself excluded, clipped
    /// to the grid.
    pub fn get_ship_neighbour_cells(&self, ship_length: usize, start_c: usize, start_r: usize,
                                    direction: Direction) -> Vec<(usize, usize)>
    {
        let mut cells = Vec::new();
        let min_c = start_c.saturating_sub(1);
        let min_r = start_r.saturating_sub(1);
        match direction {
            Horizontal => {
                let max_c = min(self.num_cols - 1, start_c + ship_length);
                if start_r > 0 {
                    for c in min_c..=max_c {
                        cells.push((c, start_r - 1));
                    }
                }
                if start_r + 1 < self.num_rows {
                    for c in min_c..=max_c {
                        cells.push((c, start_r + 1));
                    }
                }
                if start_c > 0 {
                    cells.push((start_c - 1, start_r));
                }
                if start_c + ship_length < self.num_cols {
                    cells.push((start_c + ship_length, start_r));
                }
            }
            Vertical => {
                let max_r = min(self.num_rows - 1, start_r + ship_length);
                if start_c > 0 {
                    for r in min_r..=max_r {
                        cells.push((start_c - 1, r));
                    }
                }
                if start_c + 1 < self.num_cols {
                    for r in min_r..=max_r {
                        cells.push((start_c + 1, r));
                    }
                }
                if start_r > 0 {
                    cells.push((start_c, start_r - 1));
                }
                if start_r + ship_length < self.num_rows {
                    cells.push((start_c, start_r + ship_length));
                }
            }
        }
        cells
    }

    /// The ship's cells plus the cells adjacent to it, clipped to the grid.
    pub fn get_ship_all_cells(&self, ship_length: usize, start_c: usize, start_r: usize,
                              direction: Direction) -> Vec<(usize, usize)>
    {
        let min_c = start_c.saturating_sub(1);
        let min_r = start_r.saturating_sub(1);
        let mut max_c = min(start_c + 1, self.num_cols - 1);
        let mut max_r = min(start_r + 1, self.num_rows - 1);
        match direction {
            Horizontal => max_c = min(self.num_cols - 1, start_c + ship_length),
            Vertical   => max_r = min(self.num_rows - 1, start_r + ship_length),
        }

        let mut cells = Vec::new();
        for c in min_c..=max_c {
            for r in min_r..=max_r {
                cells.push((c, r));
            }
        }
        cells
    }

    /// Feasibility test for placing a ship in the current state: the ship
    /// must fit in the grid, the aligned line's target must accommodate the
    /// length, none of the ship's cells may be water, and none of the
    /// touching cells may be occupied.
    pub fn can_place_ship(&self, ship_length: usize, start_c: usize, start_r: usize,
                          direction: Direction) -> bool
    {
        if start_c >= self.num_cols || start_r >= self.num_rows {
            return false;
        }
        match direction {
            Horizontal => {
                if start_c + ship_length > self.num_cols {
                    return false;
                }
                if self.row_sums[start_r] < ship_length {
                    return false;
                }
            }
            Vertical => {
                if start_r + ship_length > self.num_rows {
                    return false;
                }
                if self.col_sums[start_c] < ship_length {
                    return false;
                }
            }
        }

        let ship_cells = match self.get_ship_cells(ship_length, start_c, start_r, direction) {
            Ok(cells) => cells,
            Err(_)    => return false,
        };
        if ship_cells.iter().any(|&(c, r)| self.cell(c, r).is_water()) {
            return false;
        }
        !self.get_ship_neighbour_cells(ship_length, start_c, start_r, direction)
             .iter()
             .any(|&(c, r)| self.cell(c, r).is_occupied())
    }
}

impl Puzzle {
    /// Builds a puzzle from a YAML document with `ships`, `cols` and `rows`
    /// entries (whitespace-separated integers) and an optional `known` list
    /// of symbol rows. Panics on malformed documents.
    pub fn from_yaml(doc: &Yaml) -> Puzzle {
        let ship_lengths = Self::parse_int_list(&doc["ships"]);
        let col_sums = Self::parse_int_list(&doc["cols"]);
        let row_sums = Self::parse_int_list(&doc["rows"]);
        let known_grid = match &doc["known"] {
            Yaml::BadValue => None,
            known          => Some(Self::parse_known_grid(known, col_sums.len(), row_sums.len())),
        };
        Puzzle::from_sums(col_sums.len(), row_sums.len(), ship_lengths,
                          col_sums, row_sums, known_grid)
            .expect("puzzle definition is invalid")
    }

    fn parse_int_list(input: &Yaml) -> Vec<usize> {
        match input {
            Yaml::String(s)    => s.split_whitespace()
                                   .map(|int| int.trim().parse().unwrap())
                                   .collect(),
            Yaml::Integer(int) => vec![usize::try_from(*int).unwrap()],
            Yaml::Array(list)  => list.iter()
                                      .flat_map(|entry| Self::parse_int_list(entry))
                                      .collect(),
            Yaml::Null         => vec![],
            _ => panic!("Unexpected data type: {:?}", input),
        }
    }

    fn parse_known_grid(input: &Yaml, num_cols: usize, num_rows: usize) -> CellGrid {
        let rows = input.as_vec().expect("known grid must be a list of rows");
        assert!(rows.len() == num_rows,
                "known grid has {} rows, expected {}", rows.len(), num_rows);

        let mut grid = CellGrid::new(num_cols, num_rows)
            .expect("known grid dimensions must be > 0");
        for (r, row) in rows.iter().enumerate() {
            let symbols = row.as_str().expect("known grid rows must be strings");
            let tokens: Vec<&str> = symbols.split_whitespace().collect();
            assert!(tokens.len() == num_cols,
                    "known grid row {} has {} cells, expected {}", r, tokens.len(), num_cols);
            for (c, token) in tokens.iter().enumerate() {
                let symbol = token.chars().next().unwrap();
                let state = CellState::from_symbol(symbol)
                    .unwrap_or_else(|| panic!("Unexpected cell symbol: {:?}", token));
                grid.set(c, r, state, None)
                    .expect("cell within parsed grid bounds");
            }
        }
        grid
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}, ships: {:?}", self.num_cols, self.num_rows, self.ship_lengths)?;
        for r in 0..self.num_rows {
            write!(f, "\n")?;
            for c in 0..self.num_cols {
                write!(f, "{} ", self.cell(c, r).symbol())?;
            }
            write!(f, "{}", self.row_sums[r])?;
        }
        let col_sums = self.col_sums.iter()
                                    .map(|sum| sum.to_string())
                                    .collect::<Vec<_>>()
                                    .join(" ");
        write!(f, "\n{}", col_sums)
    }
}
