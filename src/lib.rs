// vim: set ai et ts=4 sw=4 sts=4:
mod generator;
mod grid;
mod puzzle;
pub mod util;

pub use generator::{generate_solved_puzzles, SolvedPuzzles};
pub use grid::{CellGrid, CellState, GridError};
pub use puzzle::{Puzzle, PuzzleError, PuzzleSolveStep, Solver};
