// vim: set ai et ts=4 sts=4 sw=4:
use std::fmt;

/// State of a single cell in a battleships grid. A cell is either unresolved,
/// water, or one of five occupied variants that pin down which part of a ship
/// it holds.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum CellState {
    Unknown,
    Water,
    OccupiedUnknown,
    OccupiedWhole,
    OccupiedMid,
    OccupiedEndLeft,
    OccupiedEndUp,
    OccupiedEndRight,
    OccupiedEndDown,
}

impl CellState {
    pub fn is_unknown(self) -> bool {
        self == CellState::Unknown
    }
    pub fn is_water(self) -> bool {
        self == CellState::Water
    }
    pub fn is_occupied(self) -> bool {
        self.is_mid() || self.is_whole() || self.is_end()
            || self == CellState::OccupiedUnknown
    }
    pub fn is_mid(self) -> bool {
        self == CellState::OccupiedMid
    }
    pub fn is_whole(self) -> bool {
        self == CellState::OccupiedWhole
    }
    pub fn is_end(self) -> bool {
        match self {
            CellState::OccupiedEndLeft
            | CellState::OccupiedEndUp
            | CellState::OccupiedEndRight
            | CellState::OccupiedEndDown => true,
            _ => false,
        }
    }

    /// The single character representing the cell in a rendered grid.
    pub fn symbol(self) -> char {
        match self {
            CellState::Unknown          => '.',
            CellState::Water            => 'w',
            CellState::OccupiedUnknown  => '#',
            CellState::OccupiedWhole    => 'O',
            CellState::OccupiedMid      => '=',
            CellState::OccupiedEndLeft  => '<',
            CellState::OccupiedEndUp    => '^',
            CellState::OccupiedEndRight => '>',
            CellState::OccupiedEndDown  => 'v',
        }
    }

    /// Inverse of `symbol`; unrecognized characters yield None.
    pub fn from_symbol(symbol: char) -> Option<CellState> {
        match symbol {
            '.' => Some(CellState::Unknown),
            'w' => Some(CellState::Water),
            '#' => Some(CellState::OccupiedUnknown),
            'O' => Some(CellState::OccupiedWhole),
            '=' => Some(CellState::OccupiedMid),
            '<' => Some(CellState::OccupiedEndLeft),
            '^' => Some(CellState::OccupiedEndUp),
            '>' => Some(CellState::OccupiedEndRight),
            'v' => Some(CellState::OccupiedEndDown),
            _   => None,
        }
    }
}
impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match *self {
            CellState::Unknown          => "Unknown",
            CellState::Water            => "Water",
            CellState::OccupiedUnknown  => "OccupiedUnknown",
            CellState::OccupiedWhole    => "OccupiedWhole",
            CellState::OccupiedMid      => "OccupiedMid",
            CellState::OccupiedEndLeft  => "OccupiedEndLeft",
            CellState::OccupiedEndUp    => "OccupiedEndUp",
            CellState::OccupiedEndRight => "OccupiedEndRight",
            CellState::OccupiedEndDown  => "OccupiedEndDown",
        })
    }
}

// ------------------------------------------------

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum GridError {
    OutOfRange { col: usize, row: usize },
    InvalidDimension { num_cols: usize, num_rows: usize },
}
impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "GridError: {}", match self {
            GridError::OutOfRange { col, row } =>
                format!("cell (col={}, row={}) is out of range", col, row),
            GridError::InvalidDimension { num_cols, num_rows } =>
                format!("number of columns and rows must be > 0, got {}x{}", num_cols, num_rows),
        })
    }
}

// ------------------------------------------------

/// A dense grid of cell states, addressed as (column, row) with both 0-based.
#[derive(PartialEq, Clone)]
pub struct CellGrid {
    num_cols: usize,
    num_rows: usize,
    cells: Vec<CellState>, // row-major
}

impl CellGrid {
    pub fn new(num_cols: usize, num_rows: usize) -> Result<CellGrid, GridError> {
        if num_cols < 1 || num_rows < 1 {
            return Err(GridError::InvalidDimension { num_cols, num_rows });
        }
        Ok(CellGrid {
            num_cols,
            num_rows,
            cells: vec![CellState::Unknown; num_cols * num_rows],
        })
    }

    pub fn num_cols(&self) -> usize { self.num_cols }
    pub fn num_rows(&self) -> usize { self.num_rows }

    pub fn get(&self, c: usize, r: usize) -> Result<CellState, GridError> {
        self.check_in_range(c, r)?;
        Ok(self.cells[r * self.num_cols + c])
    }

    /// Sets the cell at (c, r). When `expected` is given the write only
    /// happens if the current value equals it; the returned bool tells
    /// whether the write occurred.
    pub fn set(&mut self, c: usize, r: usize, state: CellState,
               expected: Option<CellState>) -> Result<bool, GridError>
    {
        self.check_in_range(c, r)?;
        let index = r * self.num_cols + c;
        if let Some(expected) = expected {
            if self.cells[index] != expected {
                return Ok(false);
            }
        }
        self.cells[index] = state;
        Ok(true)
    }

    // unchecked read for loops that stay within the grid's own dimensions
    pub(crate) fn state(&self, c: usize, r: usize) -> CellState {
        self.cells[r * self.num_cols + c]
    }

    fn check_in_range(&self, c: usize, r: usize) -> Result<(), GridError> {
        if c >= self.num_cols || r >= self.num_rows {
            return Err(GridError::OutOfRange { col: c, row: r });
        }
        Ok(())
    }
}

impl fmt::Debug for CellGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CellGrid(w={}, h={})", self.num_cols, self.num_rows)
    }
}

// ------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [CellState; 9] = [
        CellState::Unknown,
        CellState::Water,
        CellState::OccupiedUnknown,
        CellState::OccupiedWhole,
        CellState::OccupiedMid,
        CellState::OccupiedEndLeft,
        CellState::OccupiedEndUp,
        CellState::OccupiedEndRight,
        CellState::OccupiedEndDown,
    ];

    #[test]
    fn symbol_round_trip() {
        for &state in ALL_STATES.iter() {
            assert_eq!(Some(state), CellState::from_symbol(state.symbol()));
        }
    }

    #[test]
    fn invalid_symbol() {
        assert_eq!(None, CellState::from_symbol('?'));
    }

    #[test]
    fn unknown_predicates() {
        let state = CellState::Unknown;
        assert!(state.is_unknown());
        assert!(!state.is_water());
        assert!(!state.is_occupied());
    }

    #[test]
    fn water_predicates() {
        let state = CellState::Water;
        assert!(!state.is_unknown());
        assert!(state.is_water());
        assert!(!state.is_occupied());
    }

    #[test]
    fn occupied_unknown_predicates() {
        let state = CellState::OccupiedUnknown;
        assert!(!state.is_unknown());
        assert!(!state.is_water());
        assert!(state.is_occupied());
        assert!(!state.is_whole());
        assert!(!state.is_mid());
        assert!(!state.is_end());
    }

    #[test]
    fn occupied_whole_predicates() {
        let state = CellState::OccupiedWhole;
        assert!(state.is_occupied());
        assert!(state.is_whole());
        assert!(!state.is_mid());
        assert!(!state.is_end());
    }

    #[test]
    fn occupied_mid_predicates() {
        let state = CellState::OccupiedMid;
        assert!(state.is_occupied());
        assert!(!state.is_whole());
        assert!(state.is_mid());
        assert!(!state.is_end());
    }

    #[test]
    fn occupied_end_predicates() {
        for &state in &[CellState::OccupiedEndLeft,
                        CellState::OccupiedEndUp,
                        CellState::OccupiedEndRight,
                        CellState::OccupiedEndDown] {
            assert!(!state.is_unknown());
            assert!(!state.is_water());
            assert!(state.is_occupied());
            assert!(!state.is_whole());
            assert!(!state.is_mid());
            assert!(state.is_end());
        }
    }

    #[test]
    fn grid_rejects_empty_dimensions() {
        assert!(CellGrid::new(0, 1).is_err());
        assert!(CellGrid::new(1, 0).is_err());
    }

    #[test]
    fn grid_starts_unknown() {
        let grid = CellGrid::new(3, 2).unwrap();
        for c in 0..3 {
            for r in 0..2 {
                assert_eq!(CellState::Unknown, grid.get(c, r).unwrap());
            }
        }
    }

    #[test]
    fn grid_get_set_out_of_range() {
        let mut grid = CellGrid::new(2, 2).unwrap();
        assert_eq!(Err(GridError::OutOfRange { col: 2, row: 0 }), grid.get(2, 0));
        assert_eq!(Err(GridError::OutOfRange { col: 0, row: 2 }),
                   grid.set(0, 2, CellState::Water, None));
    }

    #[test]
    fn grid_set_unconditional() {
        let mut grid = CellGrid::new(2, 2).unwrap();
        assert_eq!(Ok(true), grid.set(1, 1, CellState::Water, None));
        assert_eq!(CellState::Water, grid.get(1, 1).unwrap());
    }

    #[test]
    fn grid_set_compare_and_swap() {
        let mut grid = CellGrid::new(2, 2).unwrap();
        // write goes through while the current value matches
        assert_eq!(Ok(true),
                   grid.set(0, 0, CellState::Water, Some(CellState::Unknown)));
        // second identical attempt no longer matches and must not overwrite
        assert_eq!(Ok(false),
                   grid.set(0, 0, CellState::OccupiedUnknown, Some(CellState::Unknown)));
        assert_eq!(CellState::Water, grid.get(0, 0).unwrap());
    }
}
