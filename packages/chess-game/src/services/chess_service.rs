use chess::{Board, BoardStatus, ChessMove, MoveGen, Piece, Square, EMPTY};
use std::str::FromStr;

use crate::{
    models::{
        game_record::{GameRecord, Termination},
        outcome::{GameStatus, Method, Outcome},
        played_move::PlayedMove,
        position::Position,
    },
    services::errors::chess_service_errors::ChessServiceError,
};

const THREEFOLD: usize = 3;
const FIVEFOLD: usize = 5;
const FIFTY_MOVE_PLIES: u32 = 100;
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

#[derive(Clone, Default)]
pub struct ChessService;

impl ChessService {
    pub fn new() -> Self {
        ChessService
    }

    pub fn new_game(&self) -> Position {
        Position::default()
    }

    /// Rebuild a position from stored UCI moves.
    pub fn replay(&self, moves: &[String]) -> Result<Position, ChessServiceError> {
        let mut position = self.new_game();
        for (index, uci) in moves.iter().enumerate() {
            let chess_move = parse_uci(uci)
                .filter(|m| position.board().legal(*m))
                .ok_or_else(|| {
                    ChessServiceError::InvalidPosition(format!(
                        "Move {} ({}) cannot be replayed",
                        index + 1,
                        uci
                    ))
                })?;
            self.play(&mut position, chess_move)?;
        }
        Ok(position)
    }

    /// Validate a move written in algebraic notation (or UCI coordinates) and
    /// apply it to the position.
    pub fn apply_move(
        &self,
        position: &mut Position,
        notation: &str,
    ) -> Result<PlayedMove, ChessServiceError> {
        if position.board().status() != BoardStatus::Ongoing {
            return Err(ChessServiceError::GameOver(
                "Game is already over".to_string(),
            ));
        }

        let chess_move = self.resolve_notation(position.board(), notation)?;
        self.play(position, chess_move)
    }

    pub fn resolve_notation(
        &self,
        board: &Board,
        notation: &str,
    ) -> Result<ChessMove, ChessServiceError> {
        let trimmed = notation.trim();
        if trimmed.is_empty() {
            return Err(ChessServiceError::IllegalMove("No move given".to_string()));
        }
        let illegal = || ChessServiceError::IllegalMove(format!("{} is not a legal move", trimmed));

        if let Some(chess_move) = parse_uci(trimmed) {
            return if board.legal(chess_move) {
                Ok(chess_move)
            } else {
                Err(illegal())
            };
        }

        let wanted = normalize_san(trimmed);
        if let Some(chess_move) =
            MoveGen::new_legal(board).find(|m| san_body(board, *m).replace('=', "") == wanted)
        {
            return Ok(chess_move);
        }

        let mut candidates = MoveGen::new_legal(board)
            .filter(|m| disambiguated_forms(board, *m).contains(&wanted));
        match (candidates.next(), candidates.next()) {
            (Some(chess_move), None) => Ok(chess_move),
            _ => Err(illegal()),
        }
    }

    fn play(
        &self,
        position: &mut Position,
        chess_move: ChessMove,
    ) -> Result<PlayedMove, ChessServiceError> {
        let board = *position.board();
        let source = chess_move.get_source();
        let piece = board.piece_on(source).ok_or_else(|| {
            ChessServiceError::InvalidPosition(format!("No piece on {}", source))
        })?;
        let is_en_passant = is_en_passant(&board, chess_move);
        let is_capture = board.piece_on(chess_move.get_dest()).is_some() || is_en_passant;

        let mut san = san_body(&board, chess_move);
        let next = board.make_move_new(chess_move);
        let is_checkmate = next.status() == BoardStatus::Checkmate;
        let is_check = *next.checkers() != EMPTY;
        if is_checkmate {
            san.push('#');
        } else if is_check {
            san.push('+');
        }

        let played = PlayedMove {
            chess_move,
            uci: uci_string(chess_move),
            san,
            mover: board.side_to_move().into(),
            piece,
            is_capture,
            is_en_passant,
            is_castle: is_castle(piece, chess_move),
            is_check,
            is_checkmate,
            promoted_to: chess_move.get_promotion(),
        };
        position.push(played.clone(), next, piece == Piece::Pawn || is_capture);
        Ok(played)
    }

    /// Derive the result of a game from how it was terminated (if at all) and
    /// the position on the board.
    pub fn outcome(&self, position: &Position, termination: Option<&Termination>) -> GameStatus {
        match termination {
            Some(Termination::Resigned { by }) => {
                return GameStatus::won(by.other(), Method::Resignation)
            }
            Some(Termination::DrawAgreed) => return GameStatus::draw(Method::DrawOffer),
            Some(Termination::DrawClaimed { method }) => return GameStatus::draw(*method),
            None => {}
        }

        match position.board().status() {
            BoardStatus::Checkmate => {
                // The side to move has been mated, so the previous mover won
                return GameStatus::won(position.side_to_move().other(), Method::Checkmate);
            }
            BoardStatus::Stalemate => return GameStatus::draw(Method::Stalemate),
            BoardStatus::Ongoing => {}
        }

        if position.repetitions() >= FIVEFOLD {
            GameStatus::draw(Method::FivefoldRepetition)
        } else if position.halfmove_clock() >= SEVENTY_FIVE_MOVE_PLIES {
            GameStatus::draw(Method::SeventyFiveMoveRule)
        } else if has_insufficient_material(position.board()) {
            GameStatus::draw(Method::InsufficientMaterial)
        } else {
            GameStatus::in_progress()
        }
    }

    /// A draw a player may claim but which does not end the game on its own.
    pub fn claimable_draw(&self, position: &Position) -> Option<Method> {
        if position.repetitions() >= THREEFOLD {
            Some(Method::ThreefoldRepetition)
        } else if position.halfmove_clock() >= FIFTY_MOVE_PLIES {
            Some(Method::FiftyMoveRule)
        } else {
            None
        }
    }

    pub fn move_history<'a>(&self, position: &'a Position) -> &'a [PlayedMove] {
        position.history()
    }

    /// Export a game as PGN.
    pub fn to_pgn(&self, record: &GameRecord, position: &Position, status: &GameStatus) -> String {
        let result = match status.outcome {
            Outcome::WhiteWon => "1-0",
            Outcome::BlackWon => "0-1",
            Outcome::Draw => "1/2-1/2",
            Outcome::InProgress => "*",
        };

        let date = record.header.created_at.format("%Y.%m.%d").to_string();
        let mut tags = vec![
            ("Event", "Chess game".to_string()),
            ("Site", record.id().to_string()),
            ("Date", date),
            ("White", record.header.white_player_id.clone()),
            ("Black", record.header.black_player_id.clone()),
            ("Result", result.to_string()),
        ];
        if !status.is_in_progress() {
            tags.push(("Termination", status.method.to_string()));
        }

        let mut pgn = String::new();
        for (name, value) in tags {
            let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
            pgn.push_str(&format!("[{} \"{}\"]\n", name, escaped));
        }
        pgn.push('\n');

        let mut movetext = Vec::new();
        for (index, played) in self.move_history(position).iter().enumerate() {
            if index % 2 == 0 {
                movetext.push(format!("{}.", index / 2 + 1));
            }
            movetext.push(played.san.clone());
        }
        movetext.push(result.to_string());
        pgn.push_str(&movetext.join(" "));
        pgn.push('\n');
        pgn
    }
}

fn parse_uci(text: &str) -> Option<ChessMove> {
    if !(text.len() == 4 || text.len() == 5) || !text.is_ascii() {
        return None;
    }
    let source = Square::from_str(&text[0..2]).ok()?;
    let dest = Square::from_str(&text[2..4]).ok()?;
    let promotion = match text.as_bytes().get(4) {
        None => None,
        Some(b'q') | Some(b'Q') => Some(Piece::Queen),
        Some(b'r') | Some(b'R') => Some(Piece::Rook),
        Some(b'b') | Some(b'B') => Some(Piece::Bishop),
        Some(b'n') | Some(b'N') => Some(Piece::Knight),
        Some(_) => return None,
    };
    Some(ChessMove::new(source, dest, promotion))
}

fn uci_string(chess_move: ChessMove) -> String {
    let mut uci = format!("{}{}", chess_move.get_source(), chess_move.get_dest());
    if let Some(piece) = chess_move.get_promotion() {
        uci.push(piece_letter(piece).to_ascii_lowercase());
    }
    uci
}

fn normalize_san(notation: &str) -> String {
    let trimmed = notation.trim_end_matches(|c: char| matches!(c, '+' | '#' | '!' | '?'));
    let trimmed = trimmed.strip_suffix("e.p.").unwrap_or(trimmed).trim();

    if trimmed.chars().all(|c| matches!(c, 'o' | 'O' | '0' | '-')) {
        return trimmed.replace(|c: char| c == 'o' || c == '0', "O");
    }

    let mut san = trimmed.replace('=', "").replace('-', "");
    let bytes = san.as_bytes();
    if bytes.len() >= 2
        && matches!(bytes[bytes.len() - 1], b'q' | b'r' | b'b' | b'n')
        && matches!(bytes[bytes.len() - 2], b'1' | b'8')
    {
        let last = san.pop().map(|c| c.to_ascii_uppercase());
        san.extend(last);
    }
    san
}

fn piece_letter(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'P',
        Piece::Knight => 'N',
        Piece::Bishop => 'B',
        Piece::Rook => 'R',
        Piece::Queen => 'Q',
        Piece::King => 'K',
    }
}

fn file_char(square: Square) -> char {
    (b'a' + square.get_file().to_index() as u8) as char
}

fn rank_char(square: Square) -> char {
    (b'1' + square.get_rank().to_index() as u8) as char
}

fn is_en_passant(board: &Board, chess_move: ChessMove) -> bool {
    board.piece_on(chess_move.get_source()) == Some(Piece::Pawn)
        && chess_move.get_source().get_file() != chess_move.get_dest().get_file()
        && board.piece_on(chess_move.get_dest()).is_none()
}

fn is_castle(piece: Piece, chess_move: ChessMove) -> bool {
    let from = chess_move.get_source().get_file().to_index();
    let to = chess_move.get_dest().get_file().to_index();
    piece == Piece::King && from.abs_diff(to) == 2
}

/// Piece moves written with more of the source square than SAN needs, such
/// as `Ngf3`, `N1f3` or `Ng1f3`.
fn disambiguated_forms(board: &Board, chess_move: ChessMove) -> Vec<String> {
    let source = chess_move.get_source();
    let dest = chess_move.get_dest();
    let piece = match board.piece_on(source) {
        Some(piece) if piece != Piece::Pawn && !is_castle(piece, chess_move) => piece,
        _ => return vec![],
    };

    let capture = if board.piece_on(dest).is_some() { "x" } else { "" };
    [
        file_char(source).to_string(),
        rank_char(source).to_string(),
        source.to_string(),
    ]
    .iter()
    .map(|from| format!("{}{}{}{}", piece_letter(piece), from, capture, dest))
    .collect()
}

/// Standard algebraic notation without the check suffix.
fn san_body(board: &Board, chess_move: ChessMove) -> String {
    let source = chess_move.get_source();
    let dest = chess_move.get_dest();
    let piece = match board.piece_on(source) {
        Some(piece) => piece,
        None => return uci_string(chess_move),
    };

    if is_castle(piece, chess_move) {
        return if dest.get_file().to_index() > source.get_file().to_index() {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        };
    }

    let is_capture = board.piece_on(dest).is_some() || is_en_passant(board, chess_move);
    let mut san = String::new();

    if piece == Piece::Pawn {
        if is_capture {
            san.push(file_char(source));
            san.push('x');
        }
        san.push_str(&dest.to_string());
        if let Some(promotion) = chess_move.get_promotion() {
            san.push('=');
            san.push(piece_letter(promotion));
        }
        return san;
    }

    san.push(piece_letter(piece));
    let rivals: Vec<Square> = MoveGen::new_legal(board)
        .filter(|other| {
            other.get_dest() == dest
                && other.get_source() != source
                && board.piece_on(other.get_source()) == Some(piece)
        })
        .map(|other| other.get_source())
        .collect();
    if !rivals.is_empty() {
        let shares_file = rivals.iter().any(|r| r.get_file() == source.get_file());
        let shares_rank = rivals.iter().any(|r| r.get_rank() == source.get_rank());
        if !shares_file {
            san.push(file_char(source));
        } else if !shares_rank {
            san.push(rank_char(source));
        } else {
            san.push(file_char(source));
            san.push(rank_char(source));
        }
    }
    if is_capture {
        san.push('x');
    }
    san.push_str(&dest.to_string());
    san
}

fn square_shade(square: Square) -> usize {
    (square.get_file().to_index() + square.get_rank().to_index()) % 2
}

fn has_insufficient_material(board: &Board) -> bool {
    let heavy = *board.pieces(Piece::Pawn) | *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);
    if heavy != EMPTY {
        return false;
    }

    let knights = *board.pieces(Piece::Knight);
    let bishops = *board.pieces(Piece::Bishop);
    if (knights | bishops).popcnt() <= 1 {
        return true;
    }
    if knights != EMPTY {
        return false;
    }

    // Only bishops left: a draw when they all stand on one square color
    let mut shades = bishops.map(square_shade);
    match shades.next() {
        Some(first) => shades.all(|shade| shade == first),
        None => true,
    }
}
