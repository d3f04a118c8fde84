//! [Forsyth-Edwards Notation] (FEN) support for [`GameState`].
//!
//! The rules engine tracks castling eligibility through "has moved" flags of
//! kings and rooks instead of castling rights, so the castling field is mapped
//! onto these flags when parsing and derived from them when printing.
//! Similarly, pawns are considered unmoved if and only if they stand on their
//! starting rank.
//!
//! [Forsyth-Edwards Notation]: https://www.chessprogramming.org/Forsyth-Edwards_Notation

use std::fmt::{self, Write};
use std::num::NonZeroU16;

use anyhow::{bail, Context};

use crate::chess::board::{Board, Piece};
use crate::chess::core::{CastlingSide, PieceKind, Player, Square, BOARD_WIDTH};
use crate::chess::game::GameState;

bitflags::bitflags! {
    /// Castling field of FEN. Only used while parsing and printing: the game
    /// itself relies on the "has moved" flags of kings and rooks.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct CastleRights : u8 {
        const WHITE_SHORT = 0b1000;
        const WHITE_LONG = 0b0100;
        const BLACK_SHORT = 0b0010;
        const BLACK_LONG = 0b0001;
    }
}

/// FEN symbols in the order they appear in the castling field.
const CASTLING_SYMBOLS: [(char, Player, CastlingSide); 4] = [
    ('K', Player::White, CastlingSide::Short),
    ('Q', Player::White, CastlingSide::Long),
    ('k', Player::Black, CastlingSide::Short),
    ('q', Player::Black, CastlingSide::Long),
];

impl CastleRights {
    const fn flag(player: Player, side: CastlingSide) -> Self {
        match (player, side) {
            (Player::White, CastlingSide::Short) => Self::WHITE_SHORT,
            (Player::White, CastlingSide::Long) => Self::WHITE_LONG,
            (Player::Black, CastlingSide::Short) => Self::BLACK_SHORT,
            (Player::Black, CastlingSide::Long) => Self::BLACK_LONG,
        }
    }

    /// Rights backed by an unmoved king and rook standing in their original
    /// squares.
    fn derive(board: &Board) -> Self {
        let mut rights = Self::empty();
        for (_, player, side) in CASTLING_SYMBOLS {
            if castling_pieces(board, player, side)
                .is_some_and(|(king, rook)| !king.has_moved() && !rook.has_moved())
            {
                rights |= Self::flag(player, side);
            }
        }
        rights
    }
}

impl TryFrom<&str> for CastleRights {
    type Error = anyhow::Error;

    /// Parses `-` or a non-empty subsequence of `KQkq`.
    fn try_from(input: &str) -> anyhow::Result<Self> {
        if input == "-" {
            return Ok(Self::empty());
        }
        if input.is_empty() {
            bail!("castling rights can not be empty, use '-' instead");
        }
        let mut rights = Self::empty();
        let mut next = 0;
        for symbol in input.chars() {
            let Some(offset) = CASTLING_SYMBOLS[next..]
                .iter()
                .position(|&(expected, _, _)| expected == symbol)
            else {
                bail!("unknown castle rights: {input}");
            };
            let (_, player, side) = CASTLING_SYMBOLS[next + offset];
            rights |= Self::flag(player, side);
            next += offset + 1;
        }
        Ok(rights)
    }
}

impl fmt::Display for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_char('-');
        }
        for (symbol, player, side) in CASTLING_SYMBOLS {
            if self.contains(Self::flag(player, side)) {
                f.write_char(symbol)?;
            }
        }
        Ok(())
    }
}

/// King and corner rook of the player if both stand on their original
/// squares.
fn castling_pieces(board: &Board, player: Player, side: CastlingSide) -> Option<(Piece, Piece)> {
    let rank = player.backrank();
    let king = board.at(Square::from_coords(rank, CastlingSide::KING_FILE));
    let rook = board.at(Square::from_coords(rank, side.rook_file()));
    let owned = |piece: Piece, kind| piece.kind() == Some(kind) && piece.owner() == Some(player);
    if owned(king, PieceKind::King) && owned(rook, PieceKind::Rook) {
        Some((king, rook))
    } else {
        None
    }
}

fn parse_placement(placement: &str) -> anyhow::Result<Board> {
    let mut board = Board::empty();
    let mut rank: u8 = 0;
    for rank_fen in placement.split('/') {
        if rank == BOARD_WIDTH {
            bail!("incorrect FEN: expected 8 ranks, got {placement}");
        }
        let mut file: u8 = 0;
        for symbol in rank_fen.chars() {
            if file >= BOARD_WIDTH {
                bail!("file exceeded {BOARD_WIDTH}");
            }
            match symbol {
                '0' => bail!("increment can not be 0"),
                '1'..='8' => {
                    file += symbol as u8 - b'0';
                    continue;
                },
                _ => (),
            }
            let (owner, kind) = PieceKind::from_symbol(symbol)?;
            // Pawns are unmoved on their starting rank only, kings and rooks
            // are unmoved if the castling rights say so.
            let moved = match kind {
                PieceKind::Pawn => rank != owner.pawn_rank(),
                PieceKind::King | PieceKind::Rook => true,
                _ => false,
            };
            board.put(Piece::new(kind, owner, Square::from_coords(rank, file)).with_moved(moved));
            file += 1;
        }
        if file != BOARD_WIDTH {
            bail!(
                "incorrect FEN: rank size should be exactly {BOARD_WIDTH}, got {rank_fen} of length {file}"
            );
        }
        rank += 1;
    }
    if rank != BOARD_WIDTH {
        bail!("incorrect FEN: there should be 8 ranks, got {placement}");
    }
    Ok(board)
}

fn apply_castle_rights(board: &mut Board, rights: CastleRights) -> anyhow::Result<()> {
    for (symbol, player, side) in CASTLING_SYMBOLS {
        if !rights.contains(CastleRights::flag(player, side)) {
            continue;
        }
        let Some((king, rook)) = castling_pieces(board, player, side) else {
            bail!("castling right '{symbol}' requires the king and the rook on their original squares");
        };
        board.put(king.with_moved(false));
        board.put(rook.with_moved(false));
    }
    Ok(())
}

/// The marker square has to be right behind a pawn that has just been pushed
/// by the player who is not on move.
fn place_en_passant(board: &mut Board, side_to_move: Player, square: Square) -> anyhow::Result<()> {
    let pusher = side_to_move.opponent();
    if square.rank() != pusher.en_passant_rank() {
        bail!("en passant square {square} is not on the rank skipped by {pusher} pawns");
    }
    let pushed = square
        .shift(pusher.push_direction())
        .map(|pushed| board.at(pushed));
    let origin = square
        .shift(pusher.push_direction().opposite())
        .map(|origin| board.at(origin));
    let pawn_pushed = pushed.is_some_and(|piece| {
        piece.kind() == Some(PieceKind::Pawn) && piece.owner() == Some(pusher)
    });
    if !pawn_pushed || !board.at(square).is_empty() || !origin.is_some_and(|piece| piece.is_empty())
    {
        bail!("en passant square {square} is not behind a pawn pushed by {pusher}");
    }
    board.put(Piece::en_passant_marker(square));
    Ok(())
}

fn validate(board: &Board) -> anyhow::Result<()> {
    for player in [Player::White, Player::Black] {
        let kings = board
            .pieces_of(player)
            .filter(|piece| piece.kind() == Some(PieceKind::King))
            .count();
        if kings != 1 {
            bail!("expected exactly one king of {player}, got {kings}");
        }
    }
    if let Some(pawn) = board.pieces().find(|piece| {
        piece.kind() == Some(PieceKind::Pawn)
            && [Player::White.backrank(), Player::Black.backrank()]
                .contains(&piece.position().rank())
    }) {
        bail!("pawns can not be placed on backranks, got one on {}", pawn.position());
    }
    Ok(())
}

impl GameState {
    /// Parses board from Forsyth-Edwards Notation. Trimmed FEN without the
    /// halfmove clock and fullmove counter (as used by EPD) is accepted too.
    ///
    /// NOTE: This expects properly-formatted inputs: no extra symbols or
    /// additional whitespace. Use [`GameState::try_from`] for cleaning up the
    /// input.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed input and for positions the game could
    /// not have reached: anything but one king per player, pawns on the
    /// backranks, an en passant square not behind a freshly pushed pawn,
    /// castling rights without the king and rook in place or the side not on
    /// move being in check.
    ///
    /// ```
    /// use gambit::chess::game::GameState;
    ///
    /// let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
    /// let game = GameState::from_fen(fen).unwrap();
    /// assert_eq!(game.en_passant_target().unwrap().to_string(), "e3");
    /// assert_eq!(game.to_string(), fen);
    /// ```
    pub fn from_fen(input: &str) -> anyhow::Result<Self> {
        let mut parts = input.split(' ');
        let mut board = match parts.next() {
            Some(placement) => parse_placement(placement)?,
            None => bail!("incorrect FEN: missing pieces placement"),
        };
        validate(&board)?;
        let side_to_move = match parts.next() {
            Some(value) => Player::try_from(value)?,
            None => bail!("incorrect FEN: missing side to move"),
        };
        match parts.next() {
            Some(value) => apply_castle_rights(&mut board, CastleRights::try_from(value)?)?,
            None => bail!("incorrect FEN: missing castling rights"),
        };
        match parts.next() {
            Some("-") => (),
            Some(value) => place_en_passant(&mut board, side_to_move, Square::try_from(value)?)?,
            None => bail!("incorrect FEN: missing en passant square"),
        };
        let mut result = Self::with_board(board, side_to_move);
        if result.is_in_check(side_to_move.opponent()) {
            bail!(
                "{} king can be captured: the side not on move is in check",
                side_to_move.opponent()
            );
        }
        result.halfmove_clock = match parts.next() {
            Some(value) => {
                if !value.bytes().all(|c| c.is_ascii_digit()) {
                    bail!("halfmove clock can not contain anything other than digits");
                }
                value.parse::<u16>().with_context(|| {
                    format!("incorrect FEN: halfmove clock can not be parsed {value}")
                })?
            },
            // This is a correct EPD: exit early.
            None => return Ok(result),
        };
        result.fullmove_counter = match parts.next() {
            Some(value) => {
                if !value.bytes().all(|c| c.is_ascii_digit()) {
                    bail!("fullmove counter clock can not contain anything other than digits");
                }
                value.parse::<NonZeroU16>().with_context(|| {
                    format!("incorrect FEN: fullmove counter can not be parsed {value}")
                })?
            },
            None => bail!("incorrect FEN: missing fullmove counter"),
        };
        match parts.next() {
            None => Ok(result),
            Some(_) => bail!("trailing symbols are not allowed in FEN"),
        }
    }
}

impl TryFrom<&str> for GameState {
    type Error = anyhow::Error;

    /// Trims the input and strips an optional "fen " or "epd " prefix before
    /// parsing it with [`GameState::from_fen`].
    fn try_from(input: &str) -> anyhow::Result<Self> {
        let input = input.trim();
        for prefix in ["fen ", "epd "] {
            if let Some(stripped) = input.strip_prefix(prefix) {
                return Self::from_fen(stripped);
            }
        }
        Self::from_fen(input)
    }
}

fn write_placement(board: &Board, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for rank in 0..BOARD_WIDTH {
        let mut empty_squares = 0;
        for file in 0..BOARD_WIDTH {
            let piece = board.at(Square::from_coords(rank, file));
            if piece.is_empty() {
                empty_squares += 1;
                continue;
            }
            if empty_squares != 0 {
                write!(f, "{empty_squares}")?;
                empty_squares = 0;
            }
            write!(f, "{piece}")?;
        }
        if empty_squares != 0 {
            write!(f, "{empty_squares}")?;
        }
        if rank != BOARD_WIDTH - 1 {
            f.write_char('/')?;
        }
    }
    Ok(())
}

impl fmt::Display for GameState {
    /// Prints the game in Forsyth-Edwards Notation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_placement(&self.board, f)?;
        write!(f, " {} ", &self.side_to_move)?;
        write!(f, "{} ", CastleRights::derive(&self.board))?;
        match self.en_passant_target {
            Some(square) => write!(f, "{square} "),
            None => write!(f, "- "),
        }?;
        write!(f, "{} ", &self.halfmove_clock)?;
        write!(f, "{}", &self.fullmove_counter)?;
        Ok(())
    }
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:?}", &self.board)?;
        writeln!(f, "Player to move: {:?}", &self.side_to_move)?;
        writeln!(
            f,
            "In check: white {}, black {}",
            self.is_in_check(Player::White),
            self.is_in_check(Player::Black)
        )?;
        writeln!(f, "Fullmove counter: {:?}", &self.fullmove_counter)?;
        writeln!(f, "En Passant: {:?}", &self.en_passant_target)?;
        writeln!(f, "FEN: {self}")?;
        Ok(())
    }
}
