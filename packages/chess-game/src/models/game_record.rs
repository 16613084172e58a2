use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::outcome::{Method, PlayerColor};

/// Identity metadata for a game, kept apart from the move list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameHeader {
    pub conversation_id: String,
    pub white_player_id: String,
    pub black_player_id: String,
    pub announcement_id: Option<String>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

/// A result forced by the players rather than reached on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    Resigned { by: PlayerColor },
    DrawAgreed,
    DrawClaimed { method: Method },
}

/// The persisted state of one game. Stored under the conversation id.
///
/// Moves are kept in UCI coordinate form (`e2e4`, `e7e8q`) so the position can
/// be rebuilt by replaying them; the outcome is never stored and is derived
/// again from the replayed position and `termination` on every load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub header: GameHeader,
    pub moves: Vec<String>,
    pub termination: Option<Termination>,
    pub draw_offer: Option<PlayerColor>,
}

impl GameRecord {
    pub fn new(conversation_id: &str, white_player_id: &str, black_player_id: &str) -> Self {
        GameRecord {
            header: GameHeader {
                conversation_id: conversation_id.to_string(),
                white_player_id: white_player_id.to_string(),
                black_player_id: black_player_id.to_string(),
                announcement_id: None,
                version: 0,
                created_at: Utc::now(),
            },
            moves: vec![],
            termination: None,
            draw_offer: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.header.conversation_id
    }

    pub fn player_id(&self, color: PlayerColor) -> &str {
        match color {
            PlayerColor::White => &self.header.white_player_id,
            PlayerColor::Black => &self.header.black_player_id,
        }
    }

    pub fn player_color(&self, player_id: &str) -> Option<PlayerColor> {
        if self.header.white_player_id == player_id {
            Some(PlayerColor::White)
        } else if self.header.black_player_id == player_id {
            Some(PlayerColor::Black)
        } else {
            None
        }
    }

    pub fn is_participant(&self, player_id: &str) -> bool {
        self.player_color(player_id).is_some()
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
