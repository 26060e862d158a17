// vim: set ai et ts=4 sw=4 sts=4:
use battleships::{CellGrid, CellState, Puzzle, PuzzleSolveStep, Solver};

// Runs the solver loop to completion, checking monotonicity along the way:
// every assignment lands on an Unknown or OccupiedUnknown cell, and the
// number of resolved cells never decreases.
fn solve_to_end(puzzle: Puzzle) -> Solver {
    let mut solver = Solver::new(puzzle);
    for _ in 0..500 {
        let step = solver.solve_step();
        if step.solved_cells.is_empty() {
            return solver;
        }
        let resolved_before = count_resolved(solver.puzzle());
        for &(c, r, _) in &step.solved_cells {
            let old = solver.puzzle().get_cell(c, r).unwrap();
            assert!(old.is_unknown() || old == CellState::OccupiedUnknown,
                    "step rewrote terminal cell ({}, {}): {}", c, r, old);
        }
        solver.do_step(&step).unwrap();
        assert!(count_resolved(solver.puzzle()) >= resolved_before);
    }
    panic!("solver did not terminate");
}

fn count_resolved(puzzle: &Puzzle) -> usize {
    let mut resolved = 0;
    for c in 0..puzzle.num_cols() {
        for r in 0..puzzle.num_rows() {
            let state = puzzle.get_cell(c, r).unwrap();
            if !state.is_unknown() && state != CellState::OccupiedUnknown {
                resolved += 1;
            }
        }
    }
    resolved
}

#[test]
fn solves_the_trivial_4x3_example() {
    let puzzle = Puzzle::from_sums(4, 3, vec![1, 1, 3],
                                   vec![2, 1, 2, 0], vec![3, 0, 2], None).unwrap();
    let solver = solve_to_end(puzzle);
    assert!(solver.puzzle().is_solved());
    assert_eq!("4x3, ships: [1, 1, 3]\n\
                < = > w 3\n\
                w w w w 0\n\
                O w O w 2\n\
                2 1 2 0",
               solver.puzzle().to_string());
}

#[test]
fn solves_the_6x6_example() {
    let mut known = CellGrid::new(6, 6).unwrap();
    known.set(3, 1, CellState::OccupiedUnknown, None).unwrap();
    let puzzle = Puzzle::from_sums(6, 6, vec![4, 3, 2, 2, 1, 1, 1],
                                   vec![4, 1, 3, 2, 0, 4], vec![2, 3, 0, 5, 1, 3],
                                   Some(known)).unwrap();
    let solver = solve_to_end(puzzle);
    assert!(solver.puzzle().is_solved());
    assert_eq!("6x6, ships: [4, 3, 2, 2, 1, 1, 1]\n\
                ^ w w w w O 2\n\
                v w < > w w 3\n\
                w w w w w w 0\n\
                < = = > w ^ 5\n\
                w w w w w = 1\n\
                O w O w w v 3\n\
                4 1 3 2 0 4",
               solver.puzzle().to_string());
}

#[test]
fn line_occupied_total_takes_priority_over_diagonals() {
    // column 0 already holds its single occupied cell, so rule 1 fires; the
    // diagonal-exclusion rule would also apply to (0,0) but must not win
    let mut puzzle = Puzzle::from_sums(3, 3, vec![1],
                                       vec![1, 0, 0], vec![1, 0, 0], None).unwrap();
    puzzle.set_cell(0, 0, CellState::OccupiedUnknown).unwrap();

    let step = Solver::new(puzzle).solve_step();
    assert!(step.desc.starts_with("In column 0"), "wrong rule: {}", step.desc);
    assert_eq!(vec![(0, 1, CellState::Water), (0, 2, CellState::Water)],
               step.solved_cells);
}

#[test]
fn line_unknowns_total_marks_whole_line_occupied() {
    let puzzle = Puzzle::from_sums(3, 3, vec![3],
                                   vec![1, 1, 1], vec![3, 1, 1], None).unwrap();
    let step = Solver::new(puzzle).solve_step();
    assert!(step.desc.starts_with("In row 0"), "wrong rule: {}", step.desc);
    assert_eq!(vec![(0, 0, CellState::OccupiedUnknown),
                    (1, 0, CellState::OccupiedUnknown),
                    (2, 0, CellState::OccupiedUnknown)],
               step.solved_cells);
}

#[test]
fn refines_isolated_cell_to_whole_ship() {
    let mut puzzle = Puzzle::from_sums(1, 1, vec![1], vec![1], vec![1], None).unwrap();
    puzzle.set_cell(0, 0, CellState::OccupiedUnknown).unwrap();
    let step = Solver::new(puzzle).solve_step();
    assert_eq!(vec![(0, 0, CellState::OccupiedWhole)], step.solved_cells);
}

#[test]
fn refines_a_vertical_ship_end_to_end() {
    // a fully occupied 1x3 column resolves to up-end, mid, down-end in
    // column-major scan order
    let mut puzzle = Puzzle::from_sums(1, 3, vec![3], vec![3], vec![1, 1, 1], None).unwrap();
    for r in 0..3 {
        puzzle.set_cell(0, r, CellState::OccupiedUnknown).unwrap();
    }
    let mut solver = Solver::new(puzzle);

    let step = solver.solve_step();
    assert_eq!(vec![(0, 0, CellState::OccupiedEndUp)], step.solved_cells);
    solver.do_step(&step).unwrap();

    let step = solver.solve_step();
    assert_eq!(vec![(0, 1, CellState::OccupiedMid)], step.solved_cells);
    solver.do_step(&step).unwrap();

    let step = solver.solve_step();
    assert_eq!(vec![(0, 2, CellState::OccupiedEndDown)], step.solved_cells);
    solver.do_step(&step).unwrap();

    assert_eq!("puzzle is solved", solver.solve_step().desc);
    assert!(solver.puzzle().is_solved());
}

#[test]
fn excludes_diagonals_of_an_occupied_cell() {
    let mut puzzle = Puzzle::from_sums(3, 3, vec![1],
                                       vec![1, 2, 1], vec![1, 2, 1], None).unwrap();
    puzzle.set_cell(1, 1, CellState::OccupiedUnknown).unwrap();

    let step = Solver::new(puzzle).solve_step();
    assert!(step.desc.contains("diagonal"), "wrong rule: {}", step.desc);
    assert_eq!(vec![(0, 0, CellState::Water), (0, 2, CellState::Water),
                    (2, 0, CellState::Water), (2, 2, CellState::Water)],
               step.solved_cells);
}

#[test]
fn excludes_everything_around_a_whole_ship() {
    let mut puzzle = Puzzle::from_sums(3, 3, vec![1],
                                       vec![2, 1, 1], vec![2, 1, 1], None).unwrap();
    puzzle.set_cell(1, 1, CellState::Water).unwrap();
    puzzle.set_cell(0, 0, CellState::OccupiedWhole).unwrap();

    let step = Solver::new(puzzle).solve_step();
    assert!(step.desc.contains("1-length ship"), "wrong rule: {}", step.desc);
    assert_eq!(vec![(0, 1, CellState::Water), (1, 0, CellState::Water)],
               step.solved_cells);
}

#[test]
fn propagates_an_end_marker() {
    let mut puzzle = Puzzle::from_sums(3, 3, vec![2],
                                       vec![2, 1, 2], vec![2, 1, 1], None).unwrap();
    puzzle.set_cell(1, 1, CellState::Water).unwrap();
    puzzle.set_cell(0, 0, CellState::OccupiedEndLeft).unwrap();

    let step = Solver::new(puzzle).solve_step();
    assert!(step.desc.contains("ship-end"), "wrong rule: {}", step.desc);
    // the lateral cell becomes water, the pointed-at cell becomes occupied,
    // both in the same step
    assert_eq!(vec![(0, 1, CellState::Water), (1, 0, CellState::OccupiedUnknown)],
               step.solved_cells);
}

#[test]
fn places_a_uniquely_constrained_ship() {
    // row 2 has a single slot wide enough for the 3-ship and no column can
    // take it; nothing cheaper applies, so the placement is forced
    let mut puzzle = Puzzle::from_sums(6, 5, vec![3],
                                       vec![1, 1, 1, 1, 1, 1], vec![1, 1, 3, 1, 1],
                                       None).unwrap();
    puzzle.set_cell(0, 2, CellState::Water).unwrap();
    puzzle.set_cell(4, 2, CellState::Water).unwrap();

    let step = Solver::new(puzzle).solve_step();
    assert_eq!("Ship of length 3 must go from cells 1,2 to 3,2.", step.desc);
    assert_eq!(vec![(1, 2, CellState::OccupiedUnknown),
                    (2, 2, CellState::OccupiedUnknown),
                    (3, 2, CellState::OccupiedUnknown)],
               step.solved_cells);
}

#[test]
fn reports_an_invalid_puzzle() {
    let mut puzzle = Puzzle::from_sums(1, 1, vec![], vec![0], vec![0], None).unwrap();
    puzzle.set_cell(0, 0, CellState::OccupiedUnknown).unwrap();
    let step = Solver::new(puzzle).solve_step();
    assert_eq!("puzzle is invalid", step.desc);
    assert!(step.solved_cells.is_empty());
}

#[test]
fn reports_a_stuck_puzzle() {
    // two 1-ships can never fit a 2x2 grid without touching; no rule applies
    let puzzle = Puzzle::from_sums(2, 2, vec![1, 1], vec![1, 1], vec![1, 1], None).unwrap();
    let step = Solver::new(puzzle).solve_step();
    assert_eq!("none found", step.desc);
    assert!(step.solved_cells.is_empty());
}

#[test]
fn step_rendering() {
    let step = PuzzleSolveStep::new(
        "In column 0, 1 cells are occupied, matching the total. Therefore all unknown \
         cells are water.".to_string(),
        vec![(0, 1, CellState::Water), (0, 2, CellState::OccupiedUnknown)]);
    assert_eq!("In column 0, 1 cells are occupied, matching the total. Therefore all \
                unknown cells are water.\n\
                -> Set cell 0,1 to Water\n\
                -> Set cell 0,2 to OccupiedUnknown",
               step.to_string());
    assert_eq!("none found", PuzzleSolveStep::empty("none found").to_string());
}
