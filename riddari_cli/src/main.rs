use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::Parser;
use riddari_core::board::{Board, Square};
use riddari_engine::{
    move_event::MoveEventKind, CancellationToken, Engine, SolveRequest, MAX_BOARD_SIZE,
};

/// Knight's tour solver.
///
/// Searches for a knight's tour of an NxN board using Warnsdorff's
/// heuristic with depth-first backtracking, then prints the finished
/// board as a grid of move indices.
#[derive(Parser, Debug)]
struct Args {
    /// Board side length.
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=MAX_BOARD_SIZE as i64), default_value_t = 8)]
    size: u8,

    /// Starting square as `rank,file` (0-based).
    #[arg(long, default_value = "0,0")]
    start: Square,

    /// Print every placement and backtrack as the search runs.
    #[arg(long)]
    trace: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let engine = Engine::new();
    let request = SolveRequest::new(args.size, args.start);
    let trace = args.trace;

    // Drain the event feed while the search runs; without a consumer a
    // long search would fill the channel and stall.
    let stream = engine.subscribe();
    let consumer = thread::spawn(move || {
        let mut observed: u64 = 0;
        while let Some(event) = stream.next(Duration::from_millis(300)) {
            observed += 1;
            if trace {
                match event.kind {
                    MoveEventKind::Placement => {
                        println!("move {:>3}: {}", event.index, event.square)
                    }
                    MoveEventKind::Backtrack => println!("back      {}", event.square),
                }
            }
        }
        observed
    });

    let result = match engine.solve(request, &CancellationToken::new()) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::from(2);
        }
    };
    let observed = consumer.join().expect("event consumer panicked");

    if result.solved {
        let mut board = Board::new(args.size);
        for event in &result.moves {
            board.place(event.square, event.index);
        }
        println!("{board}");
        println!(
            "tour found in {} attempts ({} backtracks), {:.2?}; {} events observed",
            result.stats.attempts, result.stats.backtracks, result.elapsed, observed
        );
        ExitCode::SUCCESS
    } else {
        println!(
            "no tour from {} on a {}x{} board; {} attempts in {:.2?}",
            args.start, args.size, args.size, result.stats.attempts, result.elapsed
        );
        ExitCode::from(1)
    }
}
