// vim: set ai et ts=4 sw=4 sts=4:
use std::collections::BTreeMap;
use std::fmt;
use log::{debug, trace};

use super::{Puzzle, PuzzleError};
use super::super::grid::CellState;
use super::super::util::{Direction, Direction::*};

/// One applied logical rule: a human-readable justification plus the cell
/// assignments it deduced. A step with no assignments carries only its
/// description ("none found", "puzzle is solved", ...).
#[derive(PartialEq, Debug, Clone)]
pub struct PuzzleSolveStep {
    pub desc: String,
    pub solved_cells: Vec<(usize, usize, CellState)>,
}

impl PuzzleSolveStep {
    pub fn new(desc: String, solved_cells: Vec<(usize, usize, CellState)>) -> Self {
        PuzzleSolveStep { desc, solved_cells }
    }
    pub fn empty(desc: &str) -> Self {
        PuzzleSolveStep {
            desc:         desc.to_string(),
            solved_cells: Vec::new(),
        }
    }
}

impl fmt::Display for PuzzleSolveStep {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.desc)?;
        for &(c, r, state) in &self.solved_cells {
            write!(f, "\n-> Set cell {},{} to {}", c, r, state)?;
        }
        Ok(())
    }
}

// ------------------------------------------------

/// Solves a puzzle step by step. Each call to `solve_step` evaluates the
/// rules in priority order and returns the first one that deduces at least
/// one cell; `do_step` applies a returned step to the puzzle. The caller
/// drives the loop and stops on an empty step or on `is_solved`.
pub struct Solver {
    puzzle: Puzzle,
    // fleet grouped by ship length, and the possible placements per length
    // recomputed on demand by the unique-placement rule
    ship_counts: BTreeMap<usize, usize>,
    ship_possibles: BTreeMap<usize, Vec<(usize, usize, Direction)>>,
}

impl Solver {
    pub fn new(puzzle: Puzzle) -> Self {
        let mut ship_counts = BTreeMap::new();
        for &length in puzzle.ship_lengths() {
            *ship_counts.entry(length).or_insert(0) += 1;
        }
        Solver {
            puzzle,
            ship_counts,
            ship_possibles: BTreeMap::new(),
        }
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }
    pub fn into_puzzle(self) -> Puzzle {
        self.puzzle
    }

    /// Applies every assignment of the given step to the puzzle.
    pub fn do_step(&mut self, step: &PuzzleSolveStep) -> Result<(), PuzzleError> {
        for &(c, r, state) in &step.solved_cells {
            self.puzzle.set_cell(c, r, state)?;
        }
        Ok(())
    }

    /// Tries all known logical rules in priority order until one solves a
    /// cell. An empty step means no rule applies and the solver is stuck.
    pub fn solve_step(&mut self) -> PuzzleSolveStep {
        if !self.puzzle.is_valid() {
            return PuzzleSolveStep::empty("puzzle is invalid");
        }
        if self.puzzle.is_solved() {
            return PuzzleSolveStep::empty("puzzle is solved");
        }

        const RULES: [fn(&Puzzle) -> PuzzleSolveStep; 6] = [
            solve_line_occupied_total_reached,
            solve_line_unknowns_total_reached,
            solve_ship_state_updates,
            solve_ship_diagonals,
            solve_ship_1_around,
            solve_ship_end_around,
        ];
        for rule in RULES.iter() {
            let step = rule(&self.puzzle);
            if !step.solved_cells.is_empty() {
                debug!("rule matched: {}", step.desc);
                return step;
            }
        }

        self.calculate_ship_possibles();
        let step = solve_place_large_ship(&self.puzzle, &self.ship_counts, &self.ship_possibles);
        if !step.solved_cells.is_empty() {
            debug!("rule matched: {}", step.desc);
            return step;
        }

        PuzzleSolveStep::empty("none found")
    }

    // Recomputes, from the current state, every placement satisfying
    // `can_place_ship` for each distinct ship length.
    fn calculate_ship_possibles(&mut self) {
        self.ship_possibles.clear();
        for &length in self.ship_counts.keys() {
            let mut possibles = Vec::new();
            for c in 0..self.puzzle.num_cols() {
                for r in 0..self.puzzle.num_rows() {
                    for &direction in &[Horizontal, Vertical] {
                        if self.puzzle.can_place_ship(length, c, r, direction) {
                            possibles.push((c, r, direction));
                        }
                    }
                }
            }
            trace!("ship length {} has {} possible placements", length, possibles.len());
            self.ship_possibles.insert(length, possibles);
        }
    }
}

// ------------------------------------------------
// The rules, tried in the order listed in Solver::solve_step. Each inspects
// the current state and returns the deduced assignments without applying
// them. Scan order (columns outer, rows inner; columns before rows for the
// line rules) determines which match is reported first and is relied upon by
// the tests.

/// A line whose occupied count already matches its target has only water
/// left in its unknown cells.
fn solve_line_occupied_total_reached(puzzle: &Puzzle) -> PuzzleSolveStep {
    for c in 0..puzzle.num_cols() {
        let unknown_cells: Vec<usize> = (0..puzzle.num_rows())
            .filter(|&r| puzzle.cell(c, r).is_unknown())
            .collect();
        if !unknown_cells.is_empty() {
            let occupied_total = puzzle.get_col_occupied_sum(c);
            if occupied_total == puzzle.get_col_sum(c) {
                return PuzzleSolveStep::new(
                    format!("In column {}, {} cells are occupied, matching the total. \
                             Therefore all unknown cells are water.", c, occupied_total),
                    unknown_cells.into_iter().map(|r| (c, r, CellState::Water)).collect());
            }
        }
    }
    for r in 0..puzzle.num_rows() {
        let unknown_cells: Vec<usize> = (0..puzzle.num_cols())
            .filter(|&c| puzzle.cell(c, r).is_unknown())
            .collect();
        if !unknown_cells.is_empty() {
            let occupied_total = puzzle.get_row_occupied_sum(r);
            if occupied_total == puzzle.get_row_sum(r) {
                return PuzzleSolveStep::new(
                    format!("In row {}, {} cells are occupied, matching the total. \
                             Therefore all unknown cells are water.", r, occupied_total),
                    unknown_cells.into_iter().map(|c| (c, r, CellState::Water)).collect());
            }
        }
    }
    PuzzleSolveStep::empty("none found")
}

/// A line where occupied plus unknown counts add up to the target can only
/// reach it by occupying every unknown cell.
fn solve_line_unknowns_total_reached(puzzle: &Puzzle) -> PuzzleSolveStep {
    for c in 0..puzzle.num_cols() {
        let unknown_cells: Vec<usize> = (0..puzzle.num_rows())
            .filter(|&r| puzzle.cell(c, r).is_unknown())
            .collect();
        if !unknown_cells.is_empty() {
            let occupied_total = puzzle.get_col_occupied_sum(c);
            let col_sum = puzzle.get_col_sum(c);
            if unknown_cells.len() + occupied_total == col_sum {
                return PuzzleSolveStep::new(
                    format!("In column {}, {} cells are occupied and {} are unknown, matching \
                             the total occupied of {}. Therefore all unknown cells are occupied.",
                            c, occupied_total, unknown_cells.len(), col_sum),
                    unknown_cells.into_iter()
                                 .map(|r| (c, r, CellState::OccupiedUnknown))
                                 .collect());
            }
        }
    }
    for r in 0..puzzle.num_rows() {
        let unknown_cells: Vec<usize> = (0..puzzle.num_cols())
            .filter(|&c| puzzle.cell(c, r).is_unknown())
            .collect();
        if !unknown_cells.is_empty() {
            let occupied_total = puzzle.get_row_occupied_sum(r);
            let row_sum = puzzle.get_row_sum(r);
            if unknown_cells.len() + occupied_total == row_sum {
                return PuzzleSolveStep::new(
                    format!("In row {}, {} cells are occupied and {} are unknown, matching \
                             the total occupied of {}. Therefore all unknown cells are occupied.",
                            r, occupied_total, unknown_cells.len(), row_sum),
                    unknown_cells.into_iter()
                                 .map(|c| (c, r, CellState::OccupiedUnknown))
                                 .collect());
            }
        }
    }
    PuzzleSolveStep::empty("none found")
}

/// Refines the first occupied-but-unspecified cell whose surroundings pin it
/// down: isolated by water on all orthogonal sides it is a whole 1-ship,
/// flanked by two occupied neighbours it is a mid section, and with exactly
/// one occupied neighbour and no unresolved ones it is the ship end pointing
/// away from that neighbour.
fn solve_ship_state_updates(puzzle: &Puzzle) -> PuzzleSolveStep {
    for c in 0..puzzle.num_cols() {
        for r in 0..puzzle.num_rows() {
            if puzzle.cell(c, r) != CellState::OccupiedUnknown {
                continue;
            }
            let desc = format!("Occupied cell at {},{} must be a specific ship part.", c, r);
            let neighbours = puzzle.get_nondiagonal_neighbour_cells(c, r);

            if neighbours.iter().all(|&(cn, rn)| puzzle.cell(cn, rn).is_water()) {
                return PuzzleSolveStep::new(desc, vec![(c, r, CellState::OccupiedWhole)]);
            }

            let occupied_count = neighbours.iter()
                                           .filter(|&&(cn, rn)| puzzle.cell(cn, rn).is_occupied())
                                           .count();
            if occupied_count == 2 {
                return PuzzleSolveStep::new(desc, vec![(c, r, CellState::OccupiedMid)]);
            }
            if occupied_count == 1
                && neighbours.iter().all(|&(cn, rn)| !puzzle.cell(cn, rn).is_unknown())
            {
                // the end marker points away from the occupied neighbour;
                // check left, up, right, down in that order
                if c > 0 && puzzle.cell(c - 1, r).is_occupied() {
                    return PuzzleSolveStep::new(desc, vec![(c, r, CellState::OccupiedEndRight)]);
                } else if r > 0 && puzzle.cell(c, r - 1).is_occupied() {
                    return PuzzleSolveStep::new(desc, vec![(c, r, CellState::OccupiedEndDown)]);
                } else if c + 1 < puzzle.num_cols() && puzzle.cell(c + 1, r).is_occupied() {
                    return PuzzleSolveStep::new(desc, vec![(c, r, CellState::OccupiedEndLeft)]);
                } else if r + 1 < puzzle.num_rows() && puzzle.cell(c, r + 1).is_occupied() {
                    return PuzzleSolveStep::new(desc, vec![(c, r, CellState::OccupiedEndUp)]);
                }
            }
        }
    }
    PuzzleSolveStep::empty("none found")
}

/// Ships never touch diagonally, so the unknown diagonal neighbours of an
/// occupied cell are water.
fn solve_ship_diagonals(puzzle: &Puzzle) -> PuzzleSolveStep {
    for c in 0..puzzle.num_cols() {
        for r in 0..puzzle.num_rows() {
            if !puzzle.cell(c, r).is_occupied() {
                continue;
            }
            let unknown_cells: Vec<(usize, usize)> = puzzle.get_diagonal_neighbour_cells(c, r)
                .into_iter()
                .filter(|&(cn, rn)| puzzle.cell(cn, rn).is_unknown())
                .collect();
            if !unknown_cells.is_empty() {
                return PuzzleSolveStep::new(
                    format!("Ships cannot lie adjacent, and cell {}, {} is occupied, \
                             so all diagonal cells are water.", c, r),
                    unknown_cells.into_iter()
                                 .map(|(cn, rn)| (cn, rn, CellState::Water))
                                 .collect());
            }
        }
    }
    PuzzleSolveStep::empty("none found")
}

/// A whole 1-length ship excludes everything around it.
fn solve_ship_1_around(puzzle: &Puzzle) -> PuzzleSolveStep {
    for c in 0..puzzle.num_cols() {
        for r in 0..puzzle.num_rows() {
            if !puzzle.cell(c, r).is_whole() {
                continue;
            }
            let unknown_cells: Vec<(usize, usize)> = puzzle.get_neighbour_cells(c, r)
                .into_iter()
                .filter(|&(cn, rn)| puzzle.cell(cn, rn).is_unknown())
                .collect();
            if !unknown_cells.is_empty() {
                return PuzzleSolveStep::new(
                    format!("Ships cannot lie next to a 1-length ship in cell {},{}, \
                             so all adjacent cells are water.", c, r),
                    unknown_cells.into_iter()
                                 .map(|(cn, rn)| (cn, rn, CellState::Water))
                                 .collect());
            }
        }
    }
    PuzzleSolveStep::empty("none found")
}

/// A ship end continues into exactly one neighbouring cell; the three cells
/// lateral to its pointing direction are water.
fn solve_ship_end_around(puzzle: &Puzzle) -> PuzzleSolveStep {
    for end_c in 0..puzzle.num_cols() {
        for end_r in 0..puzzle.num_rows() {
            let state = puzzle.cell(end_c, end_r);
            let (c, r) = (end_c as isize, end_r as isize);
            let (expected_water_cells, expected_occupied_cell) = match state {
                CellState::OccupiedEndDown =>
                    ([(c, r + 1), (c + 1, r), (c - 1, r)], (c, r - 1)),
                CellState::OccupiedEndUp =>
                    ([(c, r - 1), (c + 1, r), (c - 1, r)], (c, r + 1)),
                CellState::OccupiedEndLeft =>
                    ([(c - 1, r), (c, r + 1), (c, r - 1)], (c + 1, r)),
                CellState::OccupiedEndRight =>
                    ([(c + 1, r), (c, r + 1), (c, r - 1)], (c - 1, r)),
                _ => continue,
            };

            let mut solved_cells = Vec::new();
            for (wc, wr) in puzzle.strip_out_of_bound_cells(&expected_water_cells) {
                if puzzle.cell(wc, wr).is_unknown() {
                    solved_cells.push((wc, wr, CellState::Water));
                }
            }
            for (oc, or) in puzzle.strip_out_of_bound_cells(&[expected_occupied_cell]) {
                if puzzle.cell(oc, or).is_unknown() {
                    solved_cells.push((oc, or, CellState::OccupiedUnknown));
                }
            }
            if !solved_cells.is_empty() {
                return PuzzleSolveStep::new(
                    format!("Cell {},{} has a ship-end, so the next cell is occupied \
                             and other cells are water.", end_c, end_r),
                    solved_cells);
            }
        }
    }
    PuzzleSolveStep::empty("none found")
}

/// When a ship length has exactly as many feasible placements as there are
/// ships of that length, those placements are forced; fill the first one
/// that still contains an unknown cell.
fn solve_place_large_ship(puzzle: &Puzzle,
                          ship_counts: &BTreeMap<usize, usize>,
                          ship_possibles: &BTreeMap<usize, Vec<(usize, usize, Direction)>>)
    -> PuzzleSolveStep
{
    for (&length, possibles) in ship_possibles {
        if possibles.len() != ship_counts[&length] {
            continue;
        }
        for &(start_c, start_r, direction) in possibles {
            let ship_cells = match puzzle.get_ship_cells(length, start_c, start_r, direction) {
                Ok(cells) => cells,
                Err(_)    => continue,
            };
            if ship_cells.iter().any(|&(c, r)| puzzle.cell(c, r).is_unknown()) {
                let (mut end_c, mut end_r) = (start_c, start_r);
                match direction {
                    Horizontal => end_c += length - 1,
                    Vertical   => end_r += length - 1,
                }
                return PuzzleSolveStep::new(
                    format!("Ship of length {} must go from cells {},{} to {},{}.",
                            length, start_c, start_r, end_c, end_r),
                    ship_cells.into_iter()
                              .map(|(c, r)| (c, r, CellState::OccupiedUnknown))
                              .collect());
            }
        }
    }
    PuzzleSolveStep::empty("none found")
}
