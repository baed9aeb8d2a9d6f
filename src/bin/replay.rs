//! Replay a move sequence and print the resulting board.
//!
//! Usage:
//!   # Text dump of the top piece on each cell
//!   cargo run --bin replay -- --moves "(0,0)->(0,1) (1,0)->(0,0) (0,1)->(0,3)x2"
//!
//!   # Full state as JSON, custom players
//!   cargo run --bin replay -- --players "Ann:O,Ben:X" --moves "..." --json
//!
//! Set RUST_LOG=debug to see every move as it is applied.

use std::env;
use std::process::ExitCode;

use focus_core::{Game, Move, MoveOutcome, Piece};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_PLAYERS: &str = "Alice:X,Bob:O";

fn print_usage() {
    eprintln!("Usage: replay [--players NAME:PIECE,NAME:PIECE] [--moves \"MOVE ...\"] [--json]");
    eprintln!();
    eprintln!("Moves:");
    eprintln!("  R(r,c)           play a reserve piece at (r,c)");
    eprintln!("  (r,c)->(r,c)     move the top piece one cell");
    eprintln!("  (r,c)->(r,c)xN   move the top N pieces N cells");
}

/// Parse "NAME:PIECE,NAME:PIECE" into two players.
fn parse_players(s: &str) -> Option<[(String, Piece); 2]> {
    let mut players = s.split(',').map(|entry| {
        let (name, piece) = entry.split_once(':')?;
        Some((name.trim().to_string(), piece.parse::<Piece>().ok()?))
    });
    let first = players.next()??;
    let second = players.next()??;
    if players.next().is_some() {
        return None;
    }
    Some([first, second])
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    let mut players_str = DEFAULT_PLAYERS.to_string();
    let mut moves_str = String::new();
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--players" => {
                i += 1;
                players_str = args.get(i).cloned().unwrap_or_default();
            }
            "--moves" => {
                i += 1;
                moves_str = args.get(i).cloned().unwrap_or_default();
            }
            "--json" => {
                json = true;
            }
            "-h" | "--help" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                return ExitCode::FAILURE;
            }
        }
        i += 1;
    }

    let Some([(first, first_piece), (second, second_piece)]) = parse_players(&players_str) else {
        eprintln!("Invalid --players value: {}", players_str);
        return ExitCode::FAILURE;
    };
    let mut game = match Game::new((first.as_str(), first_piece), (second.as_str(), second_piece)) {
        Ok(game) => game,
        Err(err) => {
            error!(%err, "cannot start game");
            return ExitCode::FAILURE;
        }
    };

    let mut status = ExitCode::SUCCESS;
    for (ply, notation) in moves_str.split_whitespace().enumerate() {
        let mov: Move = match notation.parse() {
            Ok(mov) => mov,
            Err(err) => {
                error!(ply, %err, "cannot parse move");
                status = ExitCode::FAILURE;
                break;
            }
        };
        let player = game.player_turn().unwrap_or("-").to_string();
        match game.play(mov) {
            Ok(MoveOutcome::Moved) => info!(ply, %player, %mov, "moved"),
            Ok(MoveOutcome::Won) => {
                info!(ply, %player, %mov, "won the game");
                break;
            }
            Err(err) => {
                warn!(ply, %player, %mov, %err, "move rejected");
                status = ExitCode::FAILURE;
                break;
            }
        }
    }

    if json {
        match serde_json::to_string_pretty(&game.snapshot()) {
            Ok(text) => println!("{}", text),
            Err(err) => {
                error!(%err, "cannot serialize game");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", game);
        for player in game.players() {
            println!(
                "{} ({}): reserve {}, captured {}",
                player.name(),
                player.piece(),
                player.reserve(),
                player.captured()
            );
        }
        match (game.winner(), game.player_turn()) {
            (Some(winner), _) => println!("Winner: {}", winner),
            (None, Some(turn)) => println!("To move: {}", turn),
            (None, None) => {}
        }
    }

    status
}
