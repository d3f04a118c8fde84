//! Commands understood by the [`super::Session`]. Parsing never fails: input
//! that does not match any command becomes [`Command::Unknown`].

#[derive(Debug, PartialEq, Eq)]
pub(super) enum Command {
    /// Starts a new game from the standard position.
    NewGame,
    /// `position [startpos | fen <FEN>] [moves <move1> ... <move_i>]`.
    SetPosition {
        fen: Option<String>,
        moves: Vec<String>,
    },
    /// Prints the board, the side to move, check flags and FEN.
    Display,
    Fen,
    /// Legal destinations of the piece on given square.
    Moves {
        square: String,
    },
    Move {
        uci: String,
    },
    Perft {
        depth: u8,
    },
    /// Switches the side the board is rendered from.
    Flip,
    Quit,
    Unknown(String),
}

fn parse_setposition(parts: &[&str]) -> Command {
    let fen_index = parts.iter().position(|&x| x == "fen");
    let moves_index = parts.iter().position(|&x| x == "moves");
    let startpos = parts.get(1) == Some(&"startpos");
    if !startpos && fen_index != Some(1) {
        return Command::Unknown(parts.join(" "));
    }
    let fen = (!startpos).then(|| parts[2..moves_index.unwrap_or(parts.len())].join(" "));
    let moves = moves_index.map_or_else(Vec::new, |moves_index| {
        parts[moves_index + 1..]
            .iter()
            .map(|s| (*s).to_string())
            .collect()
    });
    Command::SetPosition { fen, moves }
}

impl Command {
    pub(super) fn parse(input: &str) -> Self {
        let parts: Vec<&str> = input.split_whitespace().collect();

        if parts.is_empty() {
            return Self::Unknown(input.trim().to_string());
        }

        match (parts[0], parts.get(1)) {
            ("new", None) => Self::NewGame,
            ("position", _) => parse_setposition(&parts),
            ("d", None) => Self::Display,
            ("fen", None) => Self::Fen,
            ("moves", Some(square)) if parts.len() == 2 => Self::Moves {
                square: (*square).to_string(),
            },
            ("move", Some(uci)) if parts.len() == 2 => Self::Move {
                uci: (*uci).to_string(),
            },
            ("perft", Some(depth)) if parts.len() == 2 => match depth.parse() {
                Ok(depth) => Self::Perft { depth },
                Err(_) => Self::Unknown(parts.join(" ")),
            },
            ("flip", None) => Self::Flip,
            ("quit", None) => Self::Quit,
            _ => Self::Unknown(input.trim().to_string()),
        }
    }
}
