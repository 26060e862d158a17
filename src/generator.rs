// vim: set ai et ts=4 sw=4 sts=4:
use std::cmp::min;
use std::collections::HashSet;
use log::trace;

use super::grid::{CellGrid, CellState};
use super::puzzle::{Puzzle, PuzzleError};
use super::util::{Direction, Direction::*};

/// Enumerates every solved puzzle for the given grid size and fleet: each
/// yielded puzzle places all ships without overlap or adjacency (diagonals
/// included), with its known grid fully resolved to occupied/water and the
/// line targets derived from the placement.
///
/// The search is a depth-first backtrack over the fleet in caller order,
/// positions column-major, horizontal before vertical (1-length ships try a
/// single orientation). The sequence is finite and deterministic; to restart
/// it, request a fresh iterator.
pub fn generate_solved_puzzles(num_cols: usize, num_rows: usize, ship_lengths: &[usize])
    -> Result<SolvedPuzzles, PuzzleError>
{
    if num_cols < 1 || num_rows < 1 {
        return Err(PuzzleError::InvalidDimension { num_cols, num_rows });
    }
    if let Some(&length) = ship_lengths.iter().find(|&&length| length < 1) {
        return Err(PuzzleError::InvalidShipLength { length });
    }
    Ok(SolvedPuzzles {
        num_cols,
        num_rows,
        ship_lengths: ship_lengths.to_vec(),
        occupied:     HashSet::new(),
        stack:        Vec::new(),
        started:      false,
    })
}

pub struct SolvedPuzzles {
    num_cols: usize,
    num_rows: usize,
    ship_lengths: Vec<usize>,
    // cells taken by the ships currently placed; shared by all stack levels
    // and restored on backtrack
    occupied: HashSet<(usize, usize)>,
    stack: Vec<PlacementCursor>,
    started: bool,
}

// Per-ship enumeration state: the next candidate position to try, plus the
// cells of the currently held placement so they can be released again.
struct PlacementCursor {
    col: usize,
    row: usize,
    direction: Direction,
    placed: Option<Vec<(usize, usize)>>,
}

impl PlacementCursor {
    fn new() -> Self {
        PlacementCursor {
            col:       0,
            row:       0,
            direction: Horizontal,
            placed:    None,
        }
    }
}

impl SolvedPuzzles {
    // The cells the ship would occupy, or None when it does not fit.
    fn ship_cells(&self, length: usize, c: usize, r: usize, direction: Direction)
        -> Option<Vec<(usize, usize)>>
    {
        match direction {
            Horizontal => {
                if c + length > self.num_cols {
                    return None;
                }
                Some((0..length).map(|d| (c + d, r)).collect())
            }
            Vertical => {
                if r + length > self.num_rows {
                    return None;
                }
                Some((0..length).map(|d| (c, r + d)).collect())
            }
        }
    }

    // A placement is admissible when no cell in the clipped 3x3 box around
    // any of its cells is already occupied.
    fn is_clear(&self, cells: &[(usize, usize)]) -> bool {
        cells.iter().all(|&(c, r)| {
            let min_c = c.saturating_sub(1);
            let max_c = min(c + 1, self.num_cols - 1);
            let min_r = r.saturating_sub(1);
            let max_r = min(r + 1, self.num_rows - 1);
            for cn in min_c..=max_c {
                for rn in min_r..=max_r {
                    if self.occupied.contains(&(cn, rn)) {
                        return false;
                    }
                }
            }
            true
        })
    }

    // Advances the cursor at `depth` to its next admissible placement,
    // stepping past it, and returns that placement's cells.
    fn advance(&mut self, depth: usize) -> Option<Vec<(usize, usize)>> {
        let length = self.ship_lengths[depth];
        let try_both = length > 1;
        loop {
            let (col, row, direction) = {
                let cursor = &self.stack[depth];
                if cursor.col >= self.num_cols {
                    return None;
                }
                (cursor.col, cursor.row, cursor.direction)
            };

            // step to the next (col, row, direction) combination
            {
                let cursor = &mut self.stack[depth];
                if try_both && cursor.direction == Horizontal {
                    cursor.direction = Vertical;
                } else {
                    cursor.direction = Horizontal;
                    cursor.row += 1;
                    if cursor.row >= self.num_rows {
                        cursor.row = 0;
                        cursor.col += 1;
                    }
                }
            }

            if let Some(cells) = self.ship_cells(length, col, row, direction) {
                if self.is_clear(&cells) {
                    return Some(cells);
                }
            }
        }
    }

    fn make_puzzle(&self) -> Puzzle {
        let mut known_grid = CellGrid::new(self.num_cols, self.num_rows)
            .expect("generator dimensions already validated");
        for c in 0..self.num_cols {
            for r in 0..self.num_rows {
                let state = match self.occupied.contains(&(c, r)) {
                    true  => CellState::OccupiedUnknown,
                    false => CellState::Water,
                };
                known_grid.set(c, r, state, None)
                          .expect("cell within grid bounds");
            }
        }
        let col_sums = (0..self.num_cols)
            .map(|c| (0..self.num_rows).filter(|&r| self.occupied.contains(&(c, r))).count())
            .collect();
        let row_sums = (0..self.num_rows)
            .map(|r| (0..self.num_cols).filter(|&c| self.occupied.contains(&(c, r))).count())
            .collect();
        Puzzle::from_sums(self.num_cols, self.num_rows, self.ship_lengths.clone(),
                          col_sums, row_sums, Some(known_grid))
            .expect("a completed placement always forms a valid puzzle")
    }
}

impl Iterator for SolvedPuzzles {
    type Item = Puzzle;

    fn next(&mut self) -> Option<Puzzle> {
        if self.ship_lengths.is_empty() {
            // an empty fleet has exactly one solution: all water
            if self.started {
                return None;
            }
            self.started = true;
            return Some(self.make_puzzle());
        }
        if !self.started {
            self.started = true;
            self.stack.push(PlacementCursor::new());
        }

        while !self.stack.is_empty() {
            let depth = self.stack.len() - 1;

            // release the cells this level placed on its previous attempt
            if let Some(cells) = self.stack[depth].placed.take() {
                for cell in &cells {
                    self.occupied.remove(cell);
                }
            }

            match self.advance(depth) {
                Some(cells) => {
                    for &cell in &cells {
                        self.occupied.insert(cell);
                    }
                    self.stack[depth].placed = Some(cells);
                    if self.stack.len() == self.ship_lengths.len() {
                        trace!("all {} ships placed, yielding a puzzle", self.ship_lengths.len());
                        return Some(self.make_puzzle());
                    }
                    self.stack.push(PlacementCursor::new());
                }
                None => {
                    // this ship has no further positions; backtrack
                    self.stack.pop();
                }
            }
        }
        None
    }
}
