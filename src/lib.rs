//! Focus (Domination) game logic for two players on a 6x6 board.
//!
//! # Board
//!
//! ```text
//! Every cell holds a stack of pieces, bottom (index 0) to top (last index).
//! The top piece is visible and decides who controls the stack.
//!
//! Starting layout (row-major, each cell a single piece):
//!   Row 0: X X O O X X
//!   Row 1: O O X X O O
//!   Row 2: X X O O X X
//!   Row 3: O O X X O O
//!   Row 4: X X O O X X
//!   Row 5: O O X X O O
//! ```
//!
//! # Turns
//!
//! ```text
//! Stack move:   lift the top N pieces of a stack you control and drop them
//!               exactly N cells away in a straight row or column.
//! Reserve move: play one reserve piece on top of any cell.
//!
//! A stack taller than MAX_HEIGHT sheds pieces from the bottom. The mover
//! keeps shed pieces of their own colour in reserve and captures the rest.
//! ```
//!
//! # Notation
//!
//! ```text
//! R(r,c)           reserve placement at (r,c)
//! (r,c)->(r,c)     move the top piece one cell
//! (r,c)->(r,c)xN   move the top N pieces N cells
//! ```

#[cfg(feature = "wasm")]
pub mod wasm;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace};

/// Width and height of the board.
pub const BOARD_SIZE: usize = 6;

/// Tallest stack allowed to remain on a cell after a turn.
pub const MAX_HEIGHT: usize = 5;

/// Captured pieces a player needs before a move can win the game.
pub const WIN_CAPTURES: u32 = 18;

// ============================================================================
// PIECES AND POSITIONS
// ============================================================================

/// Piece colour. Each player controls exactly one of the two.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Piece {
    X,
    O,
}

impl Piece {
    /// Character used for the piece in notation and board dumps.
    #[inline]
    pub fn symbol(self) -> char {
        match self {
            Piece::X => 'X',
            Piece::O => 'O',
        }
    }

    /// Parse a piece symbol, ignoring case.
    pub fn from_symbol(symbol: char) -> Option<Piece> {
        match symbol.to_ascii_uppercase() {
            'X' => Some(Piece::X),
            'O' => Some(Piece::O),
            _ => None,
        }
    }

    /// The other colour.
    #[inline]
    pub fn other(self) -> Piece {
        match self {
            Piece::X => Piece::O,
            Piece::O => Piece::X,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Piece {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Piece, ParseError> {
        let mut chars = s.trim().chars();
        match (chars.next().and_then(Piece::from_symbol), chars.next()) {
            (Some(piece), None) => Ok(piece),
            _ => Err(ParseError::Piece(s.to_string())),
        }
    }
}

/// Cell coordinates. Any pair can be built; `is_valid` checks the bounds.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    /// Unit steps for the four straight directions (up, down, left, right).
    const DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

    #[inline]
    pub const fn new(row: usize, col: usize) -> Pos {
        Pos { row, col }
    }

    /// Check if this position lies on the board.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    /// Iterate over all 36 cells in row-major order.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Pos { row, col }))
    }

    /// Cells travelled by a straight move to `to`.
    /// Returns None for diagonal moves and for `to == self`.
    pub fn straight_distance(self, to: Pos) -> Option<usize> {
        if self.row == to.row && self.col != to.col {
            Some(self.col.abs_diff(to.col))
        } else if self.col == to.col && self.row != to.row {
            Some(self.row.abs_diff(to.row))
        } else {
            None
        }
    }

    /// On-board cells exactly `distance` steps away in a straight line.
    pub fn straight_targets(self, distance: usize) -> impl Iterator<Item = Pos> {
        let step = distance as isize;
        Self::DIRECTIONS.into_iter().filter_map(move |(dr, dc)| {
            let row = self.row.checked_add_signed(dr * step)?;
            let col = self.col.checked_add_signed(dc * step)?;
            let pos = Pos { row, col };
            (distance > 0 && pos.is_valid()).then_some(pos)
        })
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

// ============================================================================
// CELL STACK
// ============================================================================

/// The pieces on one cell, bottom first.
#[derive(Clone, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stack {
    pieces: Vec<Piece>,
}

impl Stack {
    /// Create an empty stack.
    pub fn new() -> Stack {
        Stack { pieces: Vec::new() }
    }

    /// Create a stack holding a single piece.
    pub fn with_piece(piece: Piece) -> Stack {
        Stack { pieces: vec![piece] }
    }

    /// Add a piece on top.
    #[inline]
    pub fn push(&mut self, piece: Piece) {
        self.pieces.push(piece);
    }

    /// Remove the bottom piece. Returns None if the stack is empty.
    pub fn pop_bottom(&mut self) -> Option<Piece> {
        if self.pieces.is_empty() {
            None
        } else {
            Some(self.pieces.remove(0))
        }
    }

    /// The visible piece, or None if the stack is empty.
    #[inline]
    pub fn top(&self) -> Option<Piece> {
        self.pieces.last().copied()
    }

    /// Remove the top `n` pieces, returned bottom-to-top.
    /// Asking for more than the stack holds takes the whole stack.
    pub fn remove_top(&mut self, n: usize) -> Vec<Piece> {
        let split = self.pieces.len().saturating_sub(n);
        self.pieces.split_off(split)
    }

    /// Put `pieces` on top, keeping their order.
    pub fn append_top(&mut self, pieces: &[Piece]) {
        self.pieces.extend_from_slice(pieces);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Contents, bottom-to-top.
    #[inline]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }
}

// ============================================================================
// PLAYERS
// ============================================================================

/// Seat at the table. The first seat moves first.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Seat {
    First = 0,
    Second = 1,
}

impl Seat {
    /// Get the opposing seat.
    #[inline]
    pub fn opponent(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// A named player with their piece colour and off-board counters.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Player {
    name: String,
    piece: Piece,
    reserve: u32,
    captured: u32,
}

impl Player {
    pub fn new(name: impl Into<String>, piece: Piece) -> Player {
        Player {
            name: name.into(),
            piece,
            reserve: 0,
            captured: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn piece(&self) -> Piece {
        self.piece
    }

    /// Own pieces held off the board, ready to be played.
    pub fn reserve(&self) -> u32 {
        self.reserve
    }

    /// Opponent pieces taken out of play.
    pub fn captured(&self) -> u32 {
        self.captured
    }

    pub fn increment_captured(&mut self) {
        self.captured += 1;
    }

    pub fn increment_reserve(&mut self) {
        self.reserve += 1;
    }

    /// Take one piece out of reserve. An empty reserve stays at zero.
    pub fn decrement_reserve(&mut self) {
        self.reserve = self.reserve.saturating_sub(1);
    }
}

// ============================================================================
// MOVES AND ERRORS
// ============================================================================

/// A turn, played by whoever holds the turn.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Move {
    /// Play a piece from reserve onto a cell.
    Reserve { to: Pos },
    /// Move the top `count` pieces of a stack `count` cells.
    Stack { from: Pos, to: Pos, count: usize },
}

impl Move {
    /// Get the destination of the move.
    #[inline]
    pub fn to(&self) -> Pos {
        match self {
            Move::Reserve { to } => *to,
            Move::Stack { to, .. } => *to,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Reserve { to } => write!(f, "R{}", to),
            Move::Stack { from, to, count: 1 } => write!(f, "{}->{}", from, to),
            Move::Stack { from, to, count } => write!(f, "{}->{}x{}", from, to, count),
        }
    }
}

impl FromStr for Move {
    type Err = ParseError;

    /// Parse "R(r,c)", "(r,c)->(r,c)" or "(r,c)->(r,c)xN".
    /// Coordinates are not bounds-checked here; the game rejects off-board moves.
    fn from_str(s: &str) -> Result<Move, ParseError> {
        let s = s.trim();
        let invalid = || ParseError::Move(s.to_string());

        if let Some(rest) = s.strip_prefix(['R', 'r']) {
            let to = parse_coords(rest).ok_or_else(invalid)?;
            return Ok(Move::Reserve { to });
        }

        let (from, rest) = s.split_once("->").ok_or_else(invalid)?;
        let (to, count) = match rest.split_once(['x', 'X']) {
            Some((to, count)) => (to, count.trim().parse::<usize>().map_err(|_| invalid())?),
            None => (rest, 1),
        };

        Ok(Move::Stack {
            from: parse_coords(from).ok_or_else(invalid)?,
            to: parse_coords(to).ok_or_else(invalid)?,
            count,
        })
    }
}

/// Parse "(r,c)" into a position.
fn parse_coords(s: &str) -> Option<Pos> {
    let inner = s.trim().strip_prefix('(')?.strip_suffix(')')?;
    let (row, col) = inner.split_once(',')?;
    Some(Pos::new(row.trim().parse().ok()?, col.trim().parse().ok()?))
}

/// Result of an accepted stack move.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveOutcome {
    Moved,
    Won,
}

/// Why a move was rejected. A rejected move leaves the game untouched.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum MoveError {
    #[error("the game is over")]
    GameOver,
    #[error("it is not {0:?}'s turn")]
    NotYourTurn(String),
    #[error("no pieces in reserve")]
    EmptyReserve,
    #[error("{0} is off the board")]
    OutOfBounds(Pos),
    #[error("cannot lift {requested} pieces from a stack of {available}")]
    NotEnoughPieces { requested: usize, available: usize },
    #[error("{from} -> {to} is not a straight move of {count} cells")]
    IllegalGeometry { from: Pos, to: Pos, count: usize },
    #[error("the stack at {0} is not under the player's control")]
    NotInControl(Pos),
}

/// Invalid player setup.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum SetupError {
    #[error("both players are named {0:?}")]
    DuplicateName(String),
    #[error("both players use piece {0}")]
    DuplicatePiece(Piece),
}

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum ParseError {
    #[error("invalid piece symbol {0:?}")]
    Piece(String),
    #[error("invalid move notation {0:?}")]
    Move(String),
}

// ============================================================================
// GAME
// ============================================================================

/// Serializable view of a game.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Name of the player to move, None once the game is won.
    pub turn: Option<String>,
    pub winner: Option<String>,
    pub players: Vec<Player>,
    /// Stacks by row then column, each bottom-to-top.
    pub board: Vec<Vec<Stack>>,
}

/// A two-player game of Focus.
#[derive(Clone, Debug)]
pub struct Game {
    board: [[Stack; BOARD_SIZE]; BOARD_SIZE],
    players: [Player; 2],
    /// Seat to move; None once the game is won.
    turn: Option<Seat>,
    winner: Option<Seat>,
}

impl Game {
    /// Start a game between two `(name, piece)` pairs. The first player moves first.
    pub fn new(first: (&str, Piece), second: (&str, Piece)) -> Result<Game, SetupError> {
        if first.0 == second.0 {
            return Err(SetupError::DuplicateName(first.0.to_string()));
        }
        if first.1 == second.1 {
            return Err(SetupError::DuplicatePiece(first.1));
        }

        let board = std::array::from_fn(|row| {
            std::array::from_fn(|col| Stack::with_piece(Self::starting_piece(Pos::new(row, col))))
        });

        Ok(Game {
            board,
            players: [Player::new(first.0, first.1), Player::new(second.0, second.1)],
            turn: Some(Seat::First),
            winner: None,
        })
    }

    /// Piece on a cell in the starting layout: pairs of columns alternate, shifted every row.
    fn starting_piece(pos: Pos) -> Piece {
        if (pos.row + pos.col / 2) % 2 == 0 {
            Piece::X
        } else {
            Piece::O
        }
    }

    // ========== Queries ==========

    /// Name of the player to move, or None once the game is won.
    pub fn player_turn(&self) -> Option<&str> {
        self.turn.map(|seat| self.players[seat.index()].name())
    }

    /// Seat of the player to move.
    pub fn current_seat(&self) -> Option<Seat> {
        self.turn
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.map(|seat| self.players[seat.index()].name())
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn board(&self) -> &[[Stack; BOARD_SIZE]; BOARD_SIZE] {
        &self.board
    }

    /// The stack at `pos`, or None off the board.
    pub fn stack(&self, pos: Pos) -> Option<&Stack> {
        pos.is_valid().then(|| &self.board[pos.row][pos.col])
    }

    /// Pieces at `pos`, bottom-to-top. Empty off the board.
    pub fn pieces(&self, pos: Pos) -> &[Piece] {
        self.stack(pos).map(Stack::pieces).unwrap_or(&[])
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.name() == name)
    }

    /// Reserve count for a player, 0 for an unknown name.
    pub fn reserve(&self, name: &str) -> u32 {
        self.player(name).map_or(0, Player::reserve)
    }

    /// Captured count for a player, 0 for an unknown name.
    pub fn captured(&self, name: &str) -> u32 {
        self.player(name).map_or(0, Player::captured)
    }

    /// Check if the player in `seat` meets the winning condition:
    /// enough captures and every occupied cell topped by their piece.
    pub fn has_won(&self, seat: Seat) -> bool {
        let player = &self.players[seat.index()];
        player.captured() >= WIN_CAPTURES
            && self
                .board
                .iter()
                .flatten()
                .filter_map(Stack::top)
                .all(|top| top == player.piece())
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            turn: self.player_turn().map(str::to_string),
            winner: self.winner().map(str::to_string),
            players: self.players.to_vec(),
            board: self.board.iter().map(|row| row.to_vec()).collect(),
        }
    }

    // ========== Moves ==========

    /// Play one reserve piece on top of the stack at `to`.
    ///
    /// The win condition is not evaluated after a reserve placement.
    pub fn place_from_reserve(&mut self, player_name: &str, to: Pos) -> Result<(), MoveError> {
        let result = self
            .acting_seat(player_name)
            .and_then(|seat| self.place_for(seat, to));
        if let Err(err) = &result {
            debug!(player = player_name, %to, %err, "reserve placement rejected");
        }
        result
    }

    /// Move the top `count` pieces from `from` onto `to`, which must be exactly
    /// `count` cells away in the same row or column.
    pub fn move_pieces(
        &mut self,
        player_name: &str,
        from: Pos,
        to: Pos,
        count: usize,
    ) -> Result<MoveOutcome, MoveError> {
        let result = self
            .acting_seat(player_name)
            .and_then(|seat| self.move_for(seat, from, to, count));
        if let Err(err) = &result {
            debug!(player = player_name, %from, %to, count, %err, "stack move rejected");
        }
        result
    }

    /// Play `mov` for the player whose turn it is.
    pub fn play(&mut self, mov: Move) -> Result<MoveOutcome, MoveError> {
        let seat = self.turn.ok_or(MoveError::GameOver)?;
        let result = match mov {
            Move::Reserve { to } => self.place_for(seat, to).map(|()| MoveOutcome::Moved),
            Move::Stack { from, to, count } => self.move_for(seat, from, to, count),
        };
        if let Err(err) = &result {
            debug!(seat = ?seat, %mov, %err, "move rejected");
        }
        result
    }

    /// Generate every move the player to move can make.
    /// Empty once the game is over.
    pub fn legal_moves(&self) -> Vec<Move> {
        let Some(seat) = self.turn else {
            return Vec::new();
        };
        let player = &self.players[seat.index()];
        let mut moves = Vec::with_capacity(64);

        if player.reserve() > 0 {
            moves.extend(Pos::all().map(|to| Move::Reserve { to }));
        }

        for from in Pos::all() {
            let stack = &self.board[from.row][from.col];
            if stack.top() != Some(player.piece()) {
                continue;
            }
            for count in 1..=stack.len() {
                moves.extend(from.straight_targets(count).map(|to| Move::Stack { from, to, count }));
            }
        }

        moves
    }

    // ========== Internals ==========

    /// Resolve the seat acting for `name`, which must hold the turn.
    fn acting_seat(&self, name: &str) -> Result<Seat, MoveError> {
        let seat = self.turn.ok_or(MoveError::GameOver)?;
        if self.players[seat.index()].name() == name {
            Ok(seat)
        } else {
            Err(MoveError::NotYourTurn(name.to_string()))
        }
    }

    fn place_for(&mut self, seat: Seat, to: Pos) -> Result<(), MoveError> {
        if self.players[seat.index()].reserve() == 0 {
            return Err(MoveError::EmptyReserve);
        }
        if !to.is_valid() {
            return Err(MoveError::OutOfBounds(to));
        }

        let piece = self.players[seat.index()].piece();
        self.board[to.row][to.col].push(piece);
        self.players[seat.index()].decrement_reserve();
        self.shed_overflow(seat, to);
        self.switch_turns();

        debug!(player = self.players[seat.index()].name(), %to, "placed from reserve");
        Ok(())
    }

    fn move_for(
        &mut self,
        seat: Seat,
        from: Pos,
        to: Pos,
        count: usize,
    ) -> Result<MoveOutcome, MoveError> {
        for pos in [from, to] {
            if !pos.is_valid() {
                return Err(MoveError::OutOfBounds(pos));
            }
        }

        let available = self.board[from.row][from.col].len();
        if count > available {
            return Err(MoveError::NotEnoughPieces { requested: count, available });
        }
        if count == 0 || from.straight_distance(to) != Some(count) {
            return Err(MoveError::IllegalGeometry { from, to, count });
        }
        if self.board[from.row][from.col].top() != Some(self.players[seat.index()].piece()) {
            return Err(MoveError::NotInControl(from));
        }

        let lifted = self.board[from.row][from.col].remove_top(count);
        self.board[to.row][to.col].append_top(&lifted);
        self.shed_overflow(seat, to);
        self.switch_turns();

        let name = self.players[seat.index()].name();
        if self.has_won(seat) {
            self.turn = None;
            self.winner = Some(seat);
            info!(player = name, %from, %to, count, "game won");
            Ok(MoveOutcome::Won)
        } else {
            debug!(player = name, %from, %to, count, "moved stack");
            Ok(MoveOutcome::Moved)
        }
    }

    /// Trim the stack at `pos` down to MAX_HEIGHT from the bottom.
    /// The acting player keeps their own colour in reserve and captures the other.
    fn shed_overflow(&mut self, seat: Seat, pos: Pos) {
        let stack = &mut self.board[pos.row][pos.col];
        let player = &mut self.players[seat.index()];

        while stack.len() > MAX_HEIGHT {
            let Some(piece) = stack.pop_bottom() else {
                break;
            };
            if piece == player.piece() {
                player.increment_reserve();
                trace!(player = player.name(), %pos, "shed piece to reserve");
            } else {
                player.increment_captured();
                trace!(player = player.name(), %pos, "captured shed piece");
            }
        }
    }

    fn switch_turns(&mut self) {
        if let Some(seat) = self.turn {
            self.turn = Some(seat.opponent());
        }
    }
}

impl fmt::Display for Game {
    /// Top piece of every cell, blank for empty cells, one row per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.board {
            for (col, stack) in row.iter().enumerate() {
                if col > 0 {
                    write!(f, " ")?;
                }
                match stack.top() {
                    Some(piece) => write!(f, "{}", piece)?,
                    None => write!(f, " ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
