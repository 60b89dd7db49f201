use std::io;
use std::process;

use clap::{App, Arg, ArgGroup};
use log::info;

use pushpull_solver::config::{Method, DEFAULT_WEIGHT};
use pushpull_solver::protocol;
use pushpull_solver::solver::{self, DEFAULT_SEED};
use pushpull_solver::LoadPuzzle;

fn main() {
    env_logger::init();

    let matches = App::new("pushpull-solver")
        .about("Solves box relocation puzzles and replays the plan to a judge")
        .arg(Arg::with_name("bfs")
            .long("--bfs")
            .help("breadth-first search (default)"))
        .arg(Arg::with_name("dfs")
            .long("--dfs")
            .help("depth-first search"))
        .arg(Arg::with_name("astar")
            .long("--astar")
            .help("best-first search ranked by path cost plus heuristic"))
        .arg(Arg::with_name("wastar")
            .long("--wastar")
            .help("best-first search with a weighted heuristic"))
        .arg(Arg::with_name("greedy")
            .long("--greedy")
            .help("best-first search ranked by the heuristic alone"))
        .group(ArgGroup::with_name("strategy")
            .arg("bfs")
            .arg("dfs")
            .arg("astar")
            .arg("wastar")
            .arg("greedy"))
        .arg(Arg::with_name("weight")
            .long("--weight")
            .takes_value(true)
            .help("heuristic weight for --wastar (default 5)"))
        .arg(Arg::with_name("seed")
            .long("--seed")
            .takes_value(true)
            .help("seed for the successor shuffle"))
        .arg(Arg::with_name("file")
            .help("level file to solve offline instead of talking to a judge on stdin/stdout"))
        .get_matches();

    let weight = match matches.value_of("weight") {
        None => DEFAULT_WEIGHT,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            eprintln!("Invalid weight: {}", raw);
            process::exit(1);
        }),
    };
    let seed = match matches.value_of("seed") {
        None => DEFAULT_SEED,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            eprintln!("Invalid seed: {}", raw);
            process::exit(1);
        }),
    };

    let method = if matches.is_present("bfs") {
        Method::Bfs
    } else if matches.is_present("dfs") {
        Method::Dfs
    } else if matches.is_present("astar") {
        Method::AStar
    } else if matches.is_present("wastar") {
        Method::WeightedAStar(weight)
    } else if matches.is_present("greedy") {
        Method::Greedy
    } else {
        info!("Defaulting to BFS. Use --bfs, --dfs, --astar, --wastar or --greedy to pick a strategy");
        Method::Bfs
    };

    match matches.value_of("file") {
        Some(path) => solve_file(path, method, seed),
        None => run_judge_session(method, seed),
    }
}

/// Offline mode: solve a level from a file and print the plan.
fn solve_file(path: &str, method: Method, seed: u64) {
    let puzzle = path.load_puzzle().unwrap_or_else(|err| {
        eprintln!("Can't load level {}: {}", path, err);
        process::exit(1);
    });

    println!("Solving {}...", path);
    let solution = solver::solve_seeded(&puzzle, method, seed, true);
    match solution.plan {
        Some(ref plan) => {
            println!("Found solution of length {}", plan.len());
            print!("{}", plan);
            println!("Moves: {}", plan.move_cnt());
            println!("Pushes: {}", plan.push_cnt());
            println!("Pulls: {}", plan.pull_cnt());
        }
        None => println!("No solution"),
    }
    println!();
    print!("{}", solution.stats);
}

/// Judge mode: read the level from stdin, then send the plan one action at
/// a time, each waiting for the judge's verdict. Diagnostics go to stderr so
/// stdout stays a clean protocol channel.
fn run_judge_session(method: Method, seed: u64) {
    eprintln!("Search client initializing");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut reader = stdin.lock();
    let mut writer = stdout.lock();

    let puzzle = protocol::read_level(&mut reader).unwrap_or_else(|err| {
        eprintln!("Failed to read level: {}", err);
        process::exit(1);
    });

    let solution = solver::solve_seeded(&puzzle, method, seed, false);
    eprintln!("Summary for {}", method);
    eprint!("{}", solution.stats);

    let plan = match solution.plan {
        Some(plan) => plan,
        None => {
            eprintln!("Unable to solve level ({:?})", solution.outcome);
            return;
        }
    };
    eprintln!("Found solution of length {}", plan.len());

    if let Err(err) = protocol::execute_plan(&mut reader, &mut writer, &puzzle.level, &plan) {
        match err {
            protocol::ProtocolErr::Rejected { .. } => eprintln!("{}", err),
            protocol::ProtocolErr::Io(_) => {
                eprintln!("{}", err);
                process::exit(1);
            }
        }
    }
}
