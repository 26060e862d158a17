// vim: set ai et ts=4 sw=4 sts=4:
use std::io;
use ansi_term::Colour;
use clap::{App, Arg};
use log::{debug, info, LevelFilter};
use yaml_rust::{Yaml, YamlLoader};

use battleships::util::{is_a_tty, maybe_color};
use battleships::{generate_solved_puzzles, Puzzle, Solver};

// A trivial 4x3 starter: a 3-ship across the top row, two 1-ships below.
const EXAMPLE_0: &str = "
cols: 2 1 2 0
rows: 3 0 2
ships: 1 1 3
";

// credit to: https://krazydad.com/tablet/battleships/?kind=6x6&volumeNumber=1&bookNumber=1&puzzleNumber=1
const EXAMPLE_1: &str = r#"
cols: 4 1 3 2 0 4
rows: 2 3 0 5 1 3
ships: 4 3 2 2 1 1 1
known:
    - ". . . . . ."
    - ". . . # . ."
    - ". . . . . ."
    - ". . . . . ."
    - ". . . . . ."
    - ". . . . . ."
"#;

// credit to: https://krazydad.com/tablet/battleships/?kind=12x12&volumeNumber=1&bookNumber=1&puzzleNumber=1
const EXAMPLE_2: &str = r#"
cols: 3 0 1 4 0 1 2 3 4 3 4 0
rows: 0 5 0 0 2 6 3 0 3 1 3 2
ships: 5 4 3 3 2 2 2 1 1 1 1
known:
    - ". . . . . . . . . . . ."
    - ". . . . . . . . . . . ."
    - ". . . . . . . . . . . ."
    - ". . . . . . . . . . . ."
    - ". . . O . . . . . . . ."
    - "v . . . . . . . . . . ."
    - ". . . . . . . . . . . ."
    - ". . . . . . . . . . . ."
    - ". . . . . . . . . . . ."
    - ". . . . . . . . . . . ."
    - ". . . . . . . . . > . ."
    - ". . . . . . . . . . . ."
"#;

// credit to: https://krazydad.com/tablet/battleships/?kind=12x12&volumeNumber=5&bookNumber=5&puzzleNumber=4
const EXAMPLE_3: &str = r#"
cols: 0 2 1 5 1 2 1 0 6 1 5 1
rows: 2 2 4 0 1 1 2 5 1 3 1 3
ships: 5 4 3 3 2 2 2 1 1 1 1
known:
    - ". . . . . # . . ^ . . ."
    - ". . . . . . . . . . . ."
    - ". w . . . # . . . . . w"
    - ". . . . . . . . . . . ."
    - ". . . . . . . . . . . ."
    - ". . . . . . . . . . # ."
    - ". . . . . . . . . . . ."
    - ". . . > . . . . . . . ."
    - ". . . . . . . . . . v ."
    - ". . . . . . . . . . . ."
    - ". . . . . . . . . . . ."
    - ". . . v . . . . . > . ."
"#;

fn main() {
    let matches = App::new("battleships")
        .version("0.1.0")
        .about("Solves and generates battleships grid puzzles")
        .arg(Arg::with_name("example")
                 .short("e")
                 .long("example")
                 .takes_value(true)
                 .default_value("0")
                 .help("Index of the built-in example puzzle to solve (0-3)"))
        .arg(Arg::with_name("generate")
                 .short("g")
                 .long("generate")
                 .takes_value(true)
                 .value_name("SPEC")
                 .help("Enumerate every solved puzzle for \"COLSxROWS LEN LEN ...\" \
                        instead of solving, e.g. \"3x3 1 1 3\""))
        .arg(Arg::with_name("verbose")
                 .short("v")
                 .long("verbose")
                 .multiple(true)
                 .help("Increase logging verbosity"))
        .arg(Arg::with_name("no-color")
                 .long("no-color")
                 .help("Never emit ANSI color escapes"))
        .get_matches();

    setup_logging(matches.occurrences_of("verbose"));

    if let Some(spec) = matches.value_of("generate") {
        run_generate(spec);
    } else {
        let which: usize = matches.value_of("example").unwrap()
                                  .parse()
                                  .expect("example index must be a number");
        let emit_color = !matches.is_present("no-color") && is_a_tty(io::stdout());
        run_solve(example_puzzle(which), emit_color);
    }
}

fn setup_logging(verbosity: u64) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}][{}] {}", record.target(), record.level(), message))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .expect("logging already initialized");
}

fn example_puzzle(which: usize) -> Puzzle {
    let source = match which {
        0 => EXAMPLE_0,
        1 => EXAMPLE_1,
        2 => EXAMPLE_2,
        3 => EXAMPLE_3,
        _ => panic!("Unknown example puzzle"),
    };
    let docs: Vec<Yaml> = YamlLoader::load_from_str(source).unwrap();
    info!("loaded example puzzle {}", which);
    Puzzle::from_yaml(&docs[0])
}

fn run_solve(puzzle: Puzzle, emit_color: bool) {
    println!("{}\n", puzzle);

    let mut solver = Solver::new(puzzle);
    let mut steps = 0;
    loop {
        let step = solver.solve_step();
        println!("{}", step.desc);
        if step.solved_cells.is_empty() {
            break;
        }
        for &(c, r, state) in &step.solved_cells {
            let line = format!("-> Set cell {},{} to {}", c, r, state);
            println!("{}", maybe_color(&Colour::Green.paint(line), emit_color));
        }
        solver.do_step(&step)
              .expect("solver assignments never violate the known grid");
        steps += 1;
        debug!("grid after step {}:\n{}", steps, solver.puzzle());
    }

    println!("\n{}", solver.puzzle());
    match solver.puzzle().is_solved() {
        true  => println!("solved in {} steps", steps),
        false => println!("stuck after {} steps", steps),
    }
}

fn run_generate(spec: &str) {
    let mut tokens = spec.split_whitespace();
    let size = tokens.next().expect("generator spec must start with COLSxROWS");
    let mut dims = size.split('x');
    let num_cols: usize = dims.next().unwrap()
                              .parse().expect("invalid column count");
    let num_rows: usize = dims.next().expect("generator size must be COLSxROWS")
                              .parse().expect("invalid row count");
    let ship_lengths: Vec<usize> = tokens.map(|t| t.parse().expect("invalid ship length"))
                                         .collect();

    let puzzles = generate_solved_puzzles(num_cols, num_rows, &ship_lengths)
        .expect("invalid generator parameters");
    let mut count = 0;
    for puzzle in puzzles {
        println!("{}\n", puzzle);
        count += 1;
    }
    println!("count: {}", count);
}
