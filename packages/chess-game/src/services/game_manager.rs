use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::announcement::{AnnouncementContent, PostAction};
use crate::models::board_render::{BoardRenderSpec, Palette, RenderedImage};
use crate::models::game_record::{GameRecord, Termination};
use crate::models::outcome::{GameStatus, PlayerColor};
use crate::models::played_move::{piece_name, PlayedMove};
use crate::models::position::Position;
use crate::repositories::game_repository::{GameRepository, StoredGame};
use crate::services::achievement_service::{AchievementGranter, ACHIEVEMENT_WINNER};
use crate::services::board_renderer::BoardRenderer;
use crate::services::chess_service::ChessService;
use crate::services::errors::game_manager_errors::GameError;
use crate::services::platform::ChatPlatform;

pub const GAME_TITLE: &str = "Chess game";
pub const ACTION_MOVE: &str = "Move";
pub const ACTION_RESIGN: &str = "Resign";

/// Result of a successful move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSummary {
    pub played: PlayedMove,
    pub status: GameStatus,
    pub next_to_move: PlayerColor,
}

/// A stored game replayed into a position, with its derived status.
struct LoadedGame {
    stored: StoredGame,
    position: Position,
    status: GameStatus,
}

impl LoadedGame {
    fn record(&self) -> &GameRecord {
        &self.stored.record
    }

    fn participant(&self, player_id: &str) -> Result<PlayerColor, GameError> {
        self.record()
            .player_color(player_id)
            .ok_or(GameError::NotAParticipant)
    }

    fn ensure_in_progress(&self) -> Result<(), GameError> {
        if self.status.is_in_progress() {
            Ok(())
        } else {
            Err(GameError::GameOver)
        }
    }
}

/// Owns every change made to a game record.
///
/// Each operation loads the record, replays it, validates the request and,
/// for mutations, writes it back with a compare-and-swap against the bytes
/// that were loaded. A concurrent change surfaces as `GameError::Conflict`.
pub struct GameManager {
    repository: Arc<dyn GameRepository>,
    platform: Arc<dyn ChatPlatform>,
    achievements: Arc<dyn AchievementGranter>,
    chess: ChessService,
    renderer: BoardRenderer,
    config: Config,
}

impl GameManager {
    pub fn new(
        repository: Arc<dyn GameRepository>,
        platform: Arc<dyn ChatPlatform>,
        achievements: Arc<dyn AchievementGranter>,
        config: Config,
    ) -> Self {
        GameManager {
            repository,
            platform,
            achievements,
            chess: ChessService::new(),
            renderer: BoardRenderer::new(),
            config,
        }
    }

    pub async fn create_game(
        &self,
        player_a: &str,
        player_b: &str,
    ) -> Result<GameRecord, GameError> {
        if player_a == player_b {
            return Err(GameError::SelfChallenge);
        }

        let conversation_id = self.platform.direct_conversation(player_a, player_b).await?;
        let (previous, unreadable) = match self.load(&conversation_id).await {
            Ok(previous) => (previous, false),
            Err(GameError::CorruptRecord(reason)) => {
                warn!("Replacing unreadable game {}: {}", conversation_id, reason);
                (None, true)
            }
            Err(e) => return Err(e),
        };
        if previous.as_ref().map_or(false, |game| game.status.is_in_progress()) {
            return Err(GameError::GameAlreadyActive);
        }

        let (white, black) = {
            let mut rng = rand::thread_rng();
            assign_colors(&mut rng, player_a, player_b)
        };
        let record = GameRecord::new(&conversation_id, white, black);
        let stored = if unreadable {
            self.repository.replace(&record).await?
        } else {
            self.repository
                .save(&record, previous.as_ref().map(|game| &game.stored))
                .await?
        };
        info!(
            "Created game {} with {} as white and {} as black",
            conversation_id, white, black
        );

        let position = self.chess.new_game();
        let post = self
            .build_post(&stored.record, &position, &GameStatus::in_progress())
            .await?;
        let announcement_id = self.platform.create_announcement(&post).await?;

        let mut record = stored.record.clone();
        record.header.announcement_id = Some(announcement_id);
        let stored = self.repository.save(&record, Some(&stored)).await?;
        Ok(stored.record)
    }

    pub async fn make_move(
        &self,
        game_id: &str,
        player_id: &str,
        notation: &str,
    ) -> Result<MoveSummary, GameError> {
        let game = self.require(game_id).await?;
        game.ensure_in_progress()?;

        let turn = PlayerColor::to_move(game.record().move_count());
        if game.record().player_id(turn) != player_id {
            return Err(GameError::NotYourTurn);
        }

        let mut position = game.position.clone();
        let played = self.chess.apply_move(&mut position, notation)?;

        let mut record = game.record().clone();
        record.moves.push(played.uci.clone());
        record.draw_offer = None;
        let status = self.chess.outcome(&position, record.termination.as_ref());

        let stored = self.repository.save(&record, Some(&game.stored)).await?;
        info!("Game {}: {} played {}", game_id, turn, played.san);

        self.reward_winner(&stored.record, &game.status, &status)
            .await;

        Ok(MoveSummary {
            played,
            status,
            next_to_move: PlayerColor::to_move(stored.record.move_count()),
        })
    }

    pub async fn resign(&self, game_id: &str, player_id: &str) -> Result<GameStatus, GameError> {
        let game = self.require(game_id).await?;
        let color = game.participant(player_id)?;
        game.ensure_in_progress()?;

        let mut record = game.record().clone();
        record.termination = Some(Termination::Resigned { by: color });
        record.draw_offer = None;
        let status = self.chess.outcome(&game.position, record.termination.as_ref());

        let stored = self.repository.save(&record, Some(&game.stored)).await?;
        info!("Game {}: {} resigned", game_id, color);

        self.reward_winner(&stored.record, &game.status, &status)
            .await;
        Ok(status)
    }

    /// Offers a draw to the opponent. An offer made while the opponent's own
    /// offer is pending accepts it.
    pub async fn offer_draw(
        &self,
        game_id: &str,
        player_id: &str,
    ) -> Result<GameStatus, GameError> {
        let game = self.require(game_id).await?;
        let color = game.participant(player_id)?;
        game.ensure_in_progress()?;

        if game.record().draw_offer == Some(color.other()) {
            return self.agree_draw(game).await;
        }

        let mut record = game.record().clone();
        record.draw_offer = Some(color);
        self.repository.save(&record, Some(&game.stored)).await?;
        info!("Game {}: {} offers a draw", game_id, color);
        Ok(game.status)
    }

    pub async fn accept_draw(
        &self,
        game_id: &str,
        player_id: &str,
    ) -> Result<GameStatus, GameError> {
        let game = self.require(game_id).await?;
        let color = game.participant(player_id)?;
        game.ensure_in_progress()?;

        if game.record().draw_offer != Some(color.other()) {
            return Err(GameError::NoDrawOffer);
        }
        self.agree_draw(game).await
    }

    /// Ends the game as a draw by threefold repetition or the fifty-move rule,
    /// when the current position allows it. Only the player to move may claim.
    pub async fn claim_draw(
        &self,
        game_id: &str,
        player_id: &str,
    ) -> Result<GameStatus, GameError> {
        let game = self.require(game_id).await?;
        let color = game.participant(player_id)?;
        game.ensure_in_progress()?;
        if PlayerColor::to_move(game.record().move_count()) != color {
            return Err(GameError::NotYourTurn);
        }

        let method = self
            .chess
            .claimable_draw(&game.position)
            .ok_or(GameError::NoDrawToClaim)?;

        let mut record = game.record().clone();
        record.termination = Some(Termination::DrawClaimed { method });
        record.draw_offer = None;
        let status = self.chess.outcome(&game.position, record.termination.as_ref());

        self.repository.save(&record, Some(&game.stored)).await?;
        info!("Game {}: {} claimed a draw by {}", game_id, color, method);
        Ok(status)
    }

    pub async fn can_move(&self, game_id: &str, player_id: &str) -> bool {
        match self.load(game_id).await {
            Ok(Some(game)) => {
                let turn = PlayerColor::to_move(game.record().move_count());
                game.status.is_in_progress() && game.record().player_id(turn) == player_id
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Could not load game {}: {}", game_id, e);
                false
            }
        }
    }

    pub async fn is_participant(&self, game_id: &str, player_id: &str) -> bool {
        match self.load(game_id).await {
            Ok(Some(game)) => game.record().is_participant(player_id),
            Ok(None) => false,
            Err(e) => {
                warn!("Could not load game {}: {}", game_id, e);
                false
            }
        }
    }

    pub async fn render_parameters(&self, game_id: &str) -> Result<BoardRenderSpec, GameError> {
        let game = self.require(game_id).await?;
        Ok(render_spec(&game.position))
    }

    pub async fn board_image(
        &self,
        game_id: &str,
        palette: &Palette,
    ) -> Result<RenderedImage, GameError> {
        let spec = self.render_parameters(game_id).await?;
        Ok(self.renderer.render(&spec, palette)?)
    }

    pub async fn game_post(&self, game_id: &str) -> Result<AnnouncementContent, GameError> {
        let game = self.require(game_id).await?;
        self.build_post(game.record(), &game.position, &game.status)
            .await
    }

    /// Rebuilds the game's announcement and updates it in place, posting it
    /// first if the game has none yet.
    pub async fn refresh_announcement(
        &self,
        game_id: &str,
    ) -> Result<AnnouncementContent, GameError> {
        let game = self.require(game_id).await?;
        let mut post = self
            .build_post(game.record(), &game.position, &game.status)
            .await?;

        if post.id.is_some() {
            self.platform.update_announcement(&post).await?;
        } else {
            let announcement_id = self.platform.create_announcement(&post).await?;
            let mut record = game.record().clone();
            record.header.announcement_id = Some(announcement_id.clone());
            self.repository.save(&record, Some(&game.stored)).await?;
            post.id = Some(announcement_id);
        }
        debug!("Refreshed announcement for game {}", game_id);
        Ok(post)
    }

    pub async fn pgn(&self, game_id: &str) -> Result<String, GameError> {
        let game = self.require(game_id).await?;
        Ok(self.chess.to_pgn(game.record(), &game.position, &game.status))
    }

    async fn load(&self, game_id: &str) -> Result<Option<LoadedGame>, GameError> {
        let Some(stored) = self.repository.load(game_id).await? else {
            return Ok(None);
        };

        let position = self.chess.replay(&stored.record.moves)?;
        debug_assert_eq!(
            position.side_to_move(),
            PlayerColor::to_move(stored.record.move_count())
        );
        let status = self
            .chess
            .outcome(&position, stored.record.termination.as_ref());
        debug!(
            "Loaded game {} at move {} ({:?})",
            game_id,
            stored.record.move_count(),
            status.outcome
        );

        Ok(Some(LoadedGame {
            stored,
            position,
            status,
        }))
    }

    async fn require(&self, game_id: &str) -> Result<LoadedGame, GameError> {
        self.load(game_id).await?.ok_or(GameError::NoSuchGame)
    }

    async fn agree_draw(&self, game: LoadedGame) -> Result<GameStatus, GameError> {
        let mut record = game.record().clone();
        record.termination = Some(Termination::DrawAgreed);
        record.draw_offer = None;
        let status = self.chess.outcome(&game.position, record.termination.as_ref());

        self.repository.save(&record, Some(&game.stored)).await?;
        info!("Game {}: draw agreed", record.id());
        Ok(status)
    }

    /// Grants the winner achievement when a game goes from in progress to
    /// decisive. Failures are logged and swallowed.
    async fn reward_winner(&self, record: &GameRecord, before: &GameStatus, after: &GameStatus) {
        if !before.is_in_progress() {
            return;
        }
        let Some(winner) = after.outcome.winner() else {
            return;
        };

        let user_id = record.player_id(winner);
        if let Err(e) = self.achievements.grant(ACHIEVEMENT_WINNER, user_id).await {
            warn!(
                "Could not grant {} to {} for game {}: {}",
                ACHIEVEMENT_WINNER,
                user_id,
                record.id(),
                e
            );
        }
    }

    async fn build_post(
        &self,
        record: &GameRecord,
        position: &Position,
        status: &GameStatus,
    ) -> Result<AnnouncementContent, GameError> {
        let white = self.platform.username(&record.header.white_player_id).await?;
        let black = self.platform.username(&record.header.black_player_id).await?;

        let mut text = format!("White: {}\nBlack: {}", white, black);
        if let Some(last) = position.last_move() {
            if let Some(piece) = last.promoted_to {
                text.push_str(&format!("\nPawn promoted to {}", piece_name(piece)));
            }
            if last.is_check {
                text.push_str("\nCHECK!");
            }
        }
        text.push_str(&format!(
            "\nTurn: {}",
            PlayerColor::to_move(record.move_count())
        ));
        if let (Some(color), true) = (record.draw_offer, status.is_in_progress()) {
            text.push_str(&format!("\n{} offers a draw", color));
        }

        let actions = if status.is_in_progress() {
            vec![
                PostAction {
                    name: ACTION_MOVE.to_string(),
                    url: self.config.move_url(record.id()),
                },
                PostAction {
                    name: ACTION_RESIGN.to_string(),
                    url: self.config.resign_url(record.id()),
                },
            ]
        } else {
            vec![]
        };

        Ok(AnnouncementContent {
            id: record.header.announcement_id.clone(),
            conversation_id: record.id().to_string(),
            author_id: self.config.bot_user_id.clone(),
            title: GAME_TITLE.to_string(),
            image_url: self
                .config
                .image_url(record.id(), record.header.version),
            text,
            footer: status.footer(),
            actions,
        })
    }
}

/// Picks white and black with a fair coin flip.
pub fn assign_colors<'a, R: Rng + ?Sized>(
    rng: &mut R,
    player_a: &'a str,
    player_b: &'a str,
) -> (&'a str, &'a str) {
    if rng.gen_bool(0.5) {
        (player_a, player_b)
    } else {
        (player_b, player_a)
    }
}

fn render_spec(position: &Position) -> BoardRenderSpec {
    let mut spec = BoardRenderSpec::snapshot(position.fen());
    if let Some(last) = position.last_move() {
        spec.last_move = Some((last.from(), last.to()));
        if last.is_check {
            spec.check = Some(position.board().king_square(last.mover.other().into()));
        }
        spec.capture = last.capture_square();
    }
    spec
}
