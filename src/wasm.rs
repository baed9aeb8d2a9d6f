//! WASM bindings for focus-core
//!
//! Provides a JavaScript-friendly API for the game logic.

use wasm_bindgen::prelude::*;
use crate::{Game, Move, MoveOutcome, Piece, Pos};

/// WASM-friendly wrapper around Game
#[wasm_bindgen]
pub struct WasmGame {
    inner: Game,
}

#[wasm_bindgen]
impl WasmGame {
    /// Start a game. Pieces are "X" or "O"; the first player moves first.
    #[wasm_bindgen(constructor)]
    pub fn new(
        first_name: &str,
        first_piece: &str,
        second_name: &str,
        second_piece: &str,
    ) -> Result<WasmGame, JsValue> {
        let first_piece: Piece = first_piece.parse().map_err(to_js_error)?;
        let second_piece: Piece = second_piece.parse().map_err(to_js_error)?;
        let inner = Game::new((first_name, first_piece), (second_name, second_piece))
            .map_err(to_js_error)?;
        Ok(WasmGame { inner })
    }

    /// Name of the player to move, undefined once the game is won
    #[wasm_bindgen(js_name = playerTurn)]
    pub fn player_turn(&self) -> Option<String> {
        self.inner.player_turn().map(str::to_string)
    }

    pub fn winner(&self) -> Option<String> {
        self.inner.winner().map(str::to_string)
    }

    /// Reserve pieces for a player (0 for unknown names)
    pub fn reserve(&self, name: &str) -> u32 {
        self.inner.reserve(name)
    }

    /// Captured pieces for a player (0 for unknown names)
    pub fn captured(&self, name: &str) -> u32 {
        self.inner.captured(name)
    }

    /// Get cell stack as a string of piece symbols, bottom to top
    #[wasm_bindgen(js_name = cellStack)]
    pub fn cell_stack(&self, row: u8, col: u8) -> String {
        let pos = Pos::new(row as usize, col as usize);
        self.inner.pieces(pos).iter().map(|piece| piece.symbol()).collect()
    }

    /// Play a reserve piece. Returns true if successful.
    #[wasm_bindgen(js_name = placeFromReserve)]
    pub fn place_from_reserve(&mut self, name: &str, row: u8, col: u8) -> bool {
        let pos = Pos::new(row as usize, col as usize);
        self.inner.place_from_reserve(name, pos).is_ok()
    }

    /// Move a stack. Returns "moved", "win" or "rejected".
    #[wasm_bindgen(js_name = movePieces)]
    pub fn move_pieces(
        &mut self,
        name: &str,
        from_row: u8,
        from_col: u8,
        to_row: u8,
        to_col: u8,
        count: u8,
    ) -> String {
        let from = Pos::new(from_row as usize, from_col as usize);
        let to = Pos::new(to_row as usize, to_col as usize);
        match self.inner.move_pieces(name, from, to, count as usize) {
            Ok(MoveOutcome::Moved) => "moved".to_string(),
            Ok(MoveOutcome::Won) => "win".to_string(),
            Err(_) => "rejected".to_string(),
        }
    }

    /// Play a move in notation ("R(r,c)" or "(r,c)->(r,c)xN") for the player to move.
    /// Returns the error message for rejected or malformed moves.
    #[wasm_bindgen(js_name = playNotation)]
    pub fn play_notation(&mut self, notation: &str) -> Result<bool, JsValue> {
        let mov: Move = notation.parse().map_err(to_js_error)?;
        let outcome = self.inner.play(mov).map_err(to_js_error)?;
        Ok(outcome == MoveOutcome::Won)
    }

    /// Get legal moves as JSON array
    /// Each move is { type: "reserve", to } or { type: "stack", from, to, count }
    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.legal_moves()).map_err(JsValue::from)
    }

    /// Full game state: turn, winner, players and stacks
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.snapshot()).map_err(JsValue::from)
    }

    /// Text dump of the top piece on each cell
    #[wasm_bindgen(js_name = boardText)]
    pub fn board_text(&self) -> String {
        self.inner.to_string()
    }

    /// Check if the game has been won
    #[wasm_bindgen(js_name = isGameOver)]
    pub fn is_game_over(&self) -> bool {
        self.inner.is_over()
    }

    /// Clone the game
    #[wasm_bindgen(js_name = clone)]
    pub fn clone_game(&self) -> WasmGame {
        WasmGame { inner: self.inner.clone() }
    }
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
