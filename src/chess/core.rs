//! Chess primitives commonly used within [`crate::chess`].

use std::fmt::{self, Write};

use anyhow::{bail, Context};
use arrayvec::ArrayVec;
use itertools::Itertools;

use crate::chess::error::RulesError;

#[allow(missing_docs)]
pub const BOARD_WIDTH: u8 = 8;
#[allow(missing_docs)]
pub const BOARD_SIZE: u8 = BOARD_WIDTH * BOARD_WIDTH;

/// Upper bound on the number of legal moves in any reachable position (218),
/// rounded up. Promotions are counted once per promotion kind.
pub const MAX_MOVES: usize = 256;

/// Legal moves of one side, stored on the stack.
pub type MoveList = ArrayVec<Move, MAX_MOVES>;

/// Board coordinates: a (rank, file) pair, both in `0..BOARD_WIDTH`.
///
/// Rank 0 is the top row of the board as seen by White (Black's back rank,
/// "8" in algebraic notation) and rank 7 is White's back rank ("1"). File 0 is
/// the a-file.
///
/// ```
/// use gambit::chess::core::Square;
///
/// let square = Square::new(4, 4).unwrap();
/// assert_eq!(square.to_string(), "e4");
/// assert_eq!(Square::try_from("a8").unwrap(), Square::new(0, 0).unwrap());
/// assert_eq!(Square::try_from("h1").unwrap(), Square::new(7, 7).unwrap());
/// assert!(Square::new(8, 0).is_err());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square {
    rank: u8,
    file: u8,
}

impl Square {
    /// Connects rank (row) and file (column) to form a full square.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::OutOfBounds`] if either coordinate is outside
    /// `0..BOARD_WIDTH`.
    pub const fn new(rank: u8, file: u8) -> Result<Self, RulesError> {
        if rank >= BOARD_WIDTH || file >= BOARD_WIDTH {
            return Err(RulesError::OutOfBounds { rank, file });
        }
        Ok(Self { rank, file })
    }

    /// Callers guarantee that both coordinates are within the board.
    pub(crate) const fn from_coords(rank: u8, file: u8) -> Self {
        debug_assert!(rank < BOARD_WIDTH && file < BOARD_WIDTH);
        Self { rank, file }
    }

    /// Inverse of [`Square::index`].
    pub(crate) const fn from_index(index: u8) -> Self {
        Self::from_coords(index / BOARD_WIDTH, index % BOARD_WIDTH)
    }

    /// Row of the square, 0 being the top (Black's back rank).
    #[must_use]
    pub const fn rank(self) -> u8 {
        self.rank
    }

    /// Column of the square, 0 being the a-file.
    #[must_use]
    pub const fn file(self) -> u8 {
        self.file
    }

    /// Position of the square in a row-major walk from a8 to h1.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.rank * BOARD_WIDTH + self.file
    }

    /// Returns the square `d_rank` rows and `d_file` columns away, or [`None`]
    /// if it falls off the board.
    #[must_use]
    pub fn offset(self, d_rank: i8, d_file: i8) -> Option<Self> {
        let rank = self.rank.checked_add_signed(d_rank)?;
        let file = self.file.checked_add_signed(d_file)?;
        Self::new(rank, file).ok()
    }

    /// Moves one step in given direction.
    #[must_use]
    pub fn shift(self, direction: Direction) -> Option<Self> {
        let (d_rank, d_file) = direction.delta();
        self.offset(d_rank, d_file)
    }

    /// Iterates over all squares of the board in [`Square::index`] order.
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..BOARD_SIZE).map(Self::from_index)
    }
}

impl TryFrom<&str> for Square {
    type Error = anyhow::Error;

    /// Parses algebraic notation, e.g. "e4".
    fn try_from(square: &str) -> anyhow::Result<Self> {
        let (file, rank) = match square.chars().collect_tuple() {
            Some((file, rank)) => (file, rank),
            None => bail!(
                "square should be two-char, got {square} with {} chars",
                square.chars().count()
            ),
        };
        let file = match file {
            'a'..='h' => file as u8 - b'a',
            _ => bail!("file should be within 'a'..='h', got '{file}'"),
        };
        let rank = match rank {
            '1'..='8' => b'8' - rank as u8,
            _ => bail!("rank should be within '1'..='8', got '{rank}'"),
        };
        Self::new(rank, file).with_context(|| format!("parsing square {square}"))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char((b'a' + self.file) as char)?;
        f.write_char((b'8' - self.rank) as char)
    }
}

/// A standard game of chess is played between two players: White (having the
/// advantage of the first turn) and Black.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    White,
    Black,
}

impl Player {
    /// "Flips" the color.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Direction of the pawn pushes: White advances towards rank 0.
    #[must_use]
    pub const fn push_direction(self) -> Direction {
        match self {
            Self::White => Direction::Up,
            Self::Black => Direction::Down,
        }
    }

    /// Rank where the king and rooks start.
    #[must_use]
    pub const fn backrank(self) -> u8 {
        match self {
            Self::White => BOARD_WIDTH - 1,
            Self::Black => 0,
        }
    }

    /// Rank where the pawns start and are eligible for a double push.
    #[must_use]
    pub const fn pawn_rank(self) -> u8 {
        match self {
            Self::White => BOARD_WIDTH - 2,
            Self::Black => 1,
        }
    }

    /// Rank skipped by a double push of this player's pawns: the en passant
    /// marker is placed there.
    #[must_use]
    pub const fn en_passant_rank(self) -> u8 {
        match self {
            Self::White => BOARD_WIDTH - 3,
            Self::Black => 2,
        }
    }

    /// The farthest rank for the pawns of this player.
    #[must_use]
    pub const fn promotion_rank(self) -> u8 {
        self.opponent().backrank()
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::White => 0,
            Self::Black => 1,
        }
    }
}

impl TryFrom<&str> for Player {
    type Error = anyhow::Error;

    fn try_from(player: &str) -> anyhow::Result<Self> {
        match player {
            "w" => Ok(Self::White),
            "b" => Ok(Self::Black),
            _ => bail!("player should be 'w' or 'b', got '{player}'"),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(match &self {
            Self::White => 'w',
            Self::Black => 'b',
        })
    }
}

/// Standard [chess pieces].
///
/// [chess pieces]: https://en.wikipedia.org/wiki/Chess_piece
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// Parses a FEN piece symbol: uppercase for White, lowercase for Black.
    pub(crate) fn from_symbol(symbol: char) -> anyhow::Result<(Player, Self)> {
        let owner = if symbol.is_ascii_uppercase() {
            Player::White
        } else {
            Player::Black
        };
        let kind = match symbol.to_ascii_lowercase() {
            'k' => Self::King,
            'q' => Self::Queen,
            'r' => Self::Rook,
            'b' => Self::Bishop,
            'n' => Self::Knight,
            'p' => Self::Pawn,
            _ => bail!("piece symbol should be within \"KQRBNPkqrbnp\", got '{symbol}'"),
        };
        Ok((owner, kind))
    }

    /// FEN symbol of the piece owned by given player.
    #[must_use]
    pub fn symbol(self, owner: Player) -> char {
        let symbol = match self {
            Self::King => 'k',
            Self::Queen => 'q',
            Self::Rook => 'r',
            Self::Bishop => 'b',
            Self::Knight => 'n',
            Self::Pawn => 'p',
        };
        match owner {
            Player::White => symbol.to_ascii_uppercase(),
            Player::Black => symbol,
        }
    }
}

impl From<Promotion> for PieceKind {
    fn from(promotion: Promotion) -> Self {
        match promotion {
            Promotion::Queen => Self::Queen,
            Promotion::Rook => Self::Rook,
            Promotion::Bishop => Self::Bishop,
            Promotion::Knight => Self::Knight,
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(self.symbol(Player::Black))
    }
}

/// A pawn can be promoted to a queen, rook, bishop or a knight.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Promotion {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl Promotion {
    /// All promotion options, in the order they are offered to the player.
    pub const ALL: [Self; 4] = [Self::Queen, Self::Knight, Self::Rook, Self::Bishop];
}

impl TryFrom<char> for Promotion {
    type Error = anyhow::Error;

    fn try_from(symbol: char) -> anyhow::Result<Self> {
        match symbol {
            'q' => Ok(Self::Queen),
            'r' => Ok(Self::Rook),
            'b' => Ok(Self::Bishop),
            'n' => Ok(Self::Knight),
            _ => bail!("promotion should be one of \"qrbn\", got '{symbol}'"),
        }
    }
}

impl fmt::Display for Promotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", PieceKind::from(*self))
    }
}

/// Directions on the board from a perspective of White player.
///
/// Traditionally those are North (Up), West (Left), East (Right), South (Down)
/// and their combinations. However, using cardinal directions is confusing,
/// hence they are replaced by relative directions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Also known as NorthWest.
    UpLeft,
    /// Also known as North.
    Up,
    /// Also known as NorthEast.
    UpRight,
    /// Also known as East.
    Right,
    /// Also known as West.
    Left,
    /// Also known as SouthWest.
    DownLeft,
    /// Also known as South.
    Down,
    /// Also known as SouthEast.
    DownRight,
}

impl Direction {
    /// (rank, file) increments of a single step. "Up" decreases the rank
    /// because rank 0 is at the top.
    #[must_use]
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Self::UpLeft => (-1, -1),
            Self::Up => (-1, 0),
            Self::UpRight => (-1, 1),
            Self::Right => (0, 1),
            Self::Left => (0, -1),
            Self::DownLeft => (1, -1),
            Self::Down => (1, 0),
            Self::DownRight => (1, 1),
        }
    }

    #[must_use]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Self::UpLeft => Self::DownRight,
            Self::Up => Self::Down,
            Self::UpRight => Self::DownLeft,
            Self::Right => Self::Left,
            Self::Left => Self::Right,
            Self::DownLeft => Self::UpRight,
            Self::Down => Self::Up,
            Self::DownRight => Self::UpLeft,
        }
    }
}

/// Kingside castle is often referred to as O-O or h-side castle, queenside --
/// O-O-O or a-side castle.
///
/// The king always starts on the e-file and ends up on [`Self::king_target`],
/// the rook jumps over it and lands on [`Self::rook_target`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastlingSide {
    /// O-O.
    Short,
    /// O-O-O.
    Long,
}

impl CastlingSide {
    /// File of the king before castling.
    pub const KING_FILE: u8 = 4;

    #[allow(missing_docs)]
    pub const BOTH: [Self; 2] = [Self::Short, Self::Long];

    /// File of the corner rook taking part in castling.
    #[must_use]
    pub const fn rook_file(self) -> u8 {
        match self {
            Self::Short => BOARD_WIDTH - 1,
            Self::Long => 0,
        }
    }

    /// File the king lands on.
    #[must_use]
    pub const fn king_target(self) -> u8 {
        match self {
            Self::Short => 6,
            Self::Long => 2,
        }
    }

    /// File the rook lands on: next to the king, on the square the king
    /// passed over.
    #[must_use]
    pub const fn rook_target(self) -> u8 {
        match self {
            Self::Short => 5,
            Self::Long => 3,
        }
    }

    /// Files between the king and the rook that have to be empty.
    #[must_use]
    pub const fn between(self) -> &'static [u8] {
        match self {
            Self::Short => &[5, 6],
            Self::Long => &[1, 2, 3],
        }
    }

    /// Recognizes castling by the file an unmoved king is heading to.
    #[must_use]
    pub const fn from_king_target(file: u8) -> Option<Self> {
        match file {
            6 => Some(Self::Short),
            2 => Some(Self::Long),
            _ => None,
        }
    }
}

/// A move of a piece from one square to another, with an optional promotion
/// when a pawn reaches the last rank. Castling is encoded as a two-square king
/// move and en passant as a diagonal pawn move onto the skipped square.
///
/// The text form is the one used by [UCI]: "e2e4", "e7e8q".
///
/// [UCI]: http://wbec-ridderkerk.nl/html/UCIProtocol.html
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    from: Square,
    to: Square,
    promotion: Option<Promotion>,
}

impl Move {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(from: Square, to: Square, promotion: Option<Promotion>) -> Self {
        Self {
            from,
            to,
            promotion,
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn from(&self) -> Square {
        self.from
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn to(&self) -> Square {
        self.to
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn promotion(&self) -> Option<Promotion> {
        self.promotion
    }

    /// Parses a move in UCI format.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not 4 or 5 characters long or contains
    /// invalid squares or promotion symbol.
    pub fn from_uci(uci: &str) -> anyhow::Result<Self> {
        if !uci.is_ascii() || !(4..=5).contains(&uci.len()) {
            bail!("move should be 4 or 5 ASCII chars, got '{uci}'");
        }
        let from = Square::try_from(&uci[0..2])?;
        let to = Square::try_from(&uci[2..4])?;
        let promotion = match uci[4..].chars().next() {
            Some(symbol) => Some(Promotion::try_from(symbol)?),
            None => None,
        };
        Ok(Self::new(from, to, promotion))
    }
}

impl fmt::Display for Move {
    /// Serializes a move in [UCI format].
    ///
    /// [UCI format]: http://wbec-ridderkerk.nl/html/UCIProtocol.html
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{promotion}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::mem::size_of;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn square() {
        let squares: Vec<_> = [(0u8, 0u8), (7, 7), (7, 0), (4, 4), (8, 0), (0, 8)]
            .iter()
            .filter_map(|&(rank, file)| Square::new(rank, file).ok())
            .map(|square| square.to_string())
            .collect();
        assert_eq!(squares, vec!["a8", "h1", "a1", "e4"]);
        assert_eq!(
            Square::new(3, 9),
            Err(RulesError::OutOfBounds { rank: 3, file: 9 })
        );
    }

    #[test]
    fn square_parsing() {
        for name in ["a1", "a8", "h1", "h8", "e2", "d7"] {
            assert_eq!(Square::try_from(name).unwrap().to_string(), name);
        }
        assert_eq!(
            Square::try_from("e2").unwrap(),
            Square::new(6, 4).unwrap()
        );
        assert!(Square::try_from("i1").is_err());
        assert!(Square::try_from("a9").is_err());
        assert!(Square::try_from("a0").is_err());
        assert!(Square::try_from("e").is_err());
        assert!(Square::try_from("e44").is_err());
        // Don't crash on unicode symbols.
        assert!(Square::try_from("🔠").is_err());
    }

    #[test]
    #[should_panic(expected = "file should be within 'a'..='h', got 'i'")]
    fn square_from_incorrect_file() {
        let _ = Square::try_from("i4").unwrap();
    }

    #[test]
    fn square_index() {
        assert_eq!(Square::iter().count(), usize::from(BOARD_SIZE));
        for (index, square) in Square::iter().enumerate() {
            assert_eq!(usize::from(square.index()), index);
            assert_eq!(Square::from_index(square.index()), square);
        }
    }

    #[test]
    fn within_board_shift() {
        let square = Square::try_from("e4").unwrap();
        let shifted = |direction| square.shift(direction).map(|s| s.to_string());
        assert_eq!(shifted(Direction::Up).as_deref(), Some("e5"));
        assert_eq!(shifted(Direction::Down).as_deref(), Some("e3"));
        assert_eq!(shifted(Direction::Left).as_deref(), Some("d4"));
        assert_eq!(shifted(Direction::Right).as_deref(), Some("f4"));
        assert_eq!(shifted(Direction::UpLeft).as_deref(), Some("d5"));
        assert_eq!(shifted(Direction::UpRight).as_deref(), Some("f5"));
        assert_eq!(shifted(Direction::DownLeft).as_deref(), Some("d3"));
        assert_eq!(shifted(Direction::DownRight).as_deref(), Some("f3"));
    }

    #[test]
    fn corner_squares_shift() {
        let a1 = Square::try_from("a1").unwrap();
        for direction in [
            Direction::Left,
            Direction::UpLeft,
            Direction::Down,
            Direction::DownRight,
            Direction::DownLeft,
        ] {
            assert_eq!(a1.shift(direction), None);
        }
        let h8 = Square::try_from("h8").unwrap();
        for direction in [
            Direction::Up,
            Direction::UpRight,
            Direction::UpLeft,
            Direction::Right,
            Direction::DownRight,
        ] {
            assert_eq!(h8.shift(direction), None);
        }
        assert_eq!(
            h8.shift(Direction::DownLeft),
            Some(Square::try_from("g7").unwrap())
        );
    }

    #[test]
    fn opposite_directions_cancel_out() {
        let square = Square::try_from("d4").unwrap();
        for direction in [
            Direction::UpLeft,
            Direction::Up,
            Direction::UpRight,
            Direction::Right,
            Direction::Left,
            Direction::DownLeft,
            Direction::Down,
            Direction::DownRight,
        ] {
            assert_eq!(
                square
                    .shift(direction)
                    .and_then(|s| s.shift(direction.opposite())),
                Some(square)
            );
        }
    }

    #[test]
    fn player_ranks() {
        assert_eq!(Player::White.backrank(), 7);
        assert_eq!(Player::White.pawn_rank(), 6);
        assert_eq!(Player::White.promotion_rank(), 0);
        assert_eq!(Player::White.en_passant_rank(), 5);
        assert_eq!(Player::Black.en_passant_rank(), 2);
        assert_eq!(Player::Black.backrank(), 0);
        assert_eq!(Player::Black.pawn_rank(), 1);
        assert_eq!(Player::Black.promotion_rank(), 7);
        assert_eq!(Player::White.opponent(), Player::Black);
    }

    #[test]
    fn uci_moves() {
        for uci in ["e2e4", "g1f3", "e7e8q", "a2a1n"] {
            assert_eq!(Move::from_uci(uci).unwrap().to_string(), uci);
        }
        assert_eq!(
            Move::from_uci("b7b8r").unwrap().promotion(),
            Some(Promotion::Rook)
        );
        assert!(Move::from_uci("e2").is_err());
        assert!(Move::from_uci("e2e4k").is_err());
        assert!(Move::from_uci("e2e9").is_err());
        assert!(Move::from_uci("é2e4").is_err());
    }

    #[test]
    fn piece_symbols() {
        assert_eq!(PieceKind::Knight.symbol(Player::White), 'N');
        assert_eq!(PieceKind::Knight.symbol(Player::Black), 'n');
        assert_eq!(
            PieceKind::from_symbol('Q').unwrap(),
            (Player::White, PieceKind::Queen)
        );
        assert_eq!(
            PieceKind::from_symbol('p').unwrap(),
            (Player::Black, PieceKind::Pawn)
        );
        assert!(PieceKind::from_symbol('x').is_err());
    }

    #[test]
    fn castling_sides() {
        assert_eq!(CastlingSide::from_king_target(6), Some(CastlingSide::Short));
        assert_eq!(CastlingSide::from_king_target(2), Some(CastlingSide::Long));
        assert_eq!(CastlingSide::from_king_target(4), None);
        for side in CastlingSide::BOTH {
            assert!(side.between().contains(&side.rook_target()));
            assert!(side.between().contains(&side.king_target()));
        }
    }

    #[test]
    fn primitive_size() {
        assert_eq!(size_of::<Square>(), 2);
        assert_eq!(size_of::<PieceKind>(), size_of::<Option<PieceKind>>());
    }
}
