//! Scenario replay tests
//!
//! Loads recorded games from `tests/fixtures/scenarios.json` and verifies the
//! engine reaches exactly the recorded state:
//! - Every move before `rejected` is accepted, the `rejected` move is refused
//! - Turn holder, reserve and captured counts
//! - Every stack, bottom-to-top

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use focus_core::{Game, Move, Piece, Pos, BOARD_SIZE};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Fixture {
    version: u32,
    scenarios: Vec<Scenario>,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    description: String,
    players: [(String, Piece); 2],
    moves: Vec<String>,
    /// Index of a move expected to be refused; replay stops there.
    rejected: Option<usize>,
    expect: Expected,
}

#[derive(Debug, Deserialize)]
struct Expected {
    turn: Option<String>,
    players: HashMap<String, Counters>,
    /// Stacks as strings of piece symbols, bottom first.
    board: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct Counters {
    reserve: u32,
    captured: u32,
}

fn load_fixture() -> Fixture {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/scenarios.json");
    let file = File::open(&path).expect("Failed to open scenario fixture");
    serde_json::from_reader(BufReader::new(file)).expect("Failed to parse scenario fixture")
}

fn stack_string(game: &Game, pos: Pos) -> String {
    game.pieces(pos).iter().map(|p| p.symbol()).collect()
}

/// Replay a scenario, returning a list of mismatches.
fn replay(scenario: &Scenario) -> Vec<String> {
    let [(first, first_piece), (second, second_piece)] = &scenario.players;
    let mut game = Game::new((first.as_str(), *first_piece), (second.as_str(), *second_piece))
        .expect("fixture players must be valid");
    let mut errors = Vec::new();

    for (i, notation) in scenario.moves.iter().enumerate() {
        let mov: Move = match notation.parse() {
            Ok(mov) => mov,
            Err(err) => {
                errors.push(format!("move {}: {}", i, err));
                return errors;
            }
        };

        let before = game.snapshot();
        let result = game.play(mov);

        if scenario.rejected == Some(i) {
            if result.is_ok() {
                errors.push(format!("move {} ({}) should have been rejected", i, notation));
            } else if game.snapshot() != before {
                errors.push(format!("rejected move {} ({}) changed the game", i, notation));
            }
            break;
        }
        if let Err(err) = result {
            errors.push(format!("move {} ({}) rejected: {}", i, notation, err));
            return errors;
        }
    }

    let expect = &scenario.expect;
    if game.player_turn() != expect.turn.as_deref() {
        errors.push(format!(
            "turn: expected {:?}, got {:?}",
            expect.turn,
            game.player_turn()
        ));
    }

    for (name, counters) in &expect.players {
        let got = (game.reserve(name), game.captured(name));
        if got != (counters.reserve, counters.captured) {
            errors.push(format!(
                "{}: expected reserve/captured {}/{}, got {}/{}",
                name, counters.reserve, counters.captured, got.0, got.1
            ));
        }
    }

    assert_eq!(expect.board.len(), BOARD_SIZE);
    for pos in Pos::all() {
        let expected = &expect.board[pos.row][pos.col];
        let got = stack_string(&game, pos);
        if &got != expected {
            errors.push(format!("stack {}: expected {:?}, got {:?}", pos, expected, got));
        }
    }

    errors
}

#[test]
fn test_recorded_scenarios() {
    let fixture = load_fixture();
    assert!(!fixture.scenarios.is_empty());

    let mut failures = Vec::new();
    for scenario in &fixture.scenarios {
        let errors = replay(scenario);
        if !errors.is_empty() {
            failures.push(format!("{}\n  {}", scenario.description, errors.join("\n  ")));
        }
    }

    assert!(
        failures.is_empty(),
        "{} scenarios failed:\n{}",
        failures.len(),
        failures.join("\n")
    );
}

#[test]
fn test_recorded_moves_are_generated() {
    // Every recorded move must also appear in the generated move list
    let fixture = load_fixture();

    for scenario in &fixture.scenarios {
        let [(first, first_piece), (second, second_piece)] = &scenario.players;
        let mut game =
            Game::new((first.as_str(), *first_piece), (second.as_str(), *second_piece)).unwrap();

        for (i, notation) in scenario.moves.iter().enumerate() {
            if scenario.rejected == Some(i) {
                break;
            }
            let mov: Move = notation.parse().unwrap();
            assert!(
                game.legal_moves().contains(&mov),
                "{}: move {} ({}) missing from legal moves",
                scenario.description,
                i,
                notation
            );
            game.play(mov).unwrap();
        }
    }
}

#[test]
fn test_recorded_games_conserve_pieces() {
    let fixture = load_fixture();

    for scenario in &fixture.scenarios {
        let on_board: usize = scenario
            .expect
            .board
            .iter()
            .flatten()
            .map(|stack| stack.len())
            .sum();
        let off_board: u32 = scenario
            .expect
            .players
            .values()
            .map(|c| c.reserve + c.captured)
            .sum();
        assert_eq!(
            on_board as u32 + off_board,
            36,
            "{}: piece count drifted",
            scenario.description
        );
    }
}
