use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use chess_game::config::Config;
use chess_game::models::board_render::Palette;
use chess_game::repositories::game_repository::KvGameRepository;
use chess_game::repositories::kv_store::{DynamoDbKvStore, KvStore, MemoryKvStore};
use chess_game::services::achievement_service::{
    default_achievements, BadgeRegistry, LoggingAchievementGranter,
};
use chess_game::services::errors::game_manager_errors::GameError;
use chess_game::services::game_manager::GameManager;
use chess_game::services::platform::LocalPlatform;
use chess_game::telemetry::init_tracing;

type Error = Box<dyn std::error::Error + Send + Sync>;

const HELP: &str = "Commands:
  challenge <player> <opponent>
  move <game> <player> <notation>
  resign <game> <player>
  offer <game> <player>
  accept <game> <player>
  claim <game> <player>
  post <game>
  board <game>
  pgn <game>
  quit";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Challenge { player: String, opponent: String },
    Move { game: String, player: String, notation: String },
    Resign { game: String, player: String },
    Offer { game: String, player: String },
    Accept { game: String, player: String },
    Claim { game: String, player: String },
    Post { game: String },
    Board { game: String },
    Pgn { game: String },
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Command, String> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let owned = |i: usize| words[i].to_string();
        let command = match words.as_slice() {
            ["challenge", _, _] => Command::Challenge {
                player: owned(1),
                opponent: owned(2),
            },
            ["move", _, _, _, ..] => Command::Move {
                game: owned(1),
                player: owned(2),
                notation: words[3..].join(" "),
            },
            ["resign", _, _] => Command::Resign {
                game: owned(1),
                player: owned(2),
            },
            ["offer", _, _] => Command::Offer {
                game: owned(1),
                player: owned(2),
            },
            ["accept", _, _] => Command::Accept {
                game: owned(1),
                player: owned(2),
            },
            ["claim", _, _] => Command::Claim {
                game: owned(1),
                player: owned(2),
            },
            ["post", _] => Command::Post { game: owned(1) },
            ["board", _] => Command::Board { game: owned(1) },
            ["pgn", _] => Command::Pgn { game: owned(1) },
            ["help"] | [] => Command::Help,
            ["quit"] | ["exit"] => Command::Quit,
            _ => return Err(format!("Unrecognised command: {}", line.trim())),
        };
        Ok(command)
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = Config::from_env()?;
    let store: Arc<dyn KvStore> = match &config.games_table {
        Some(table) => {
            let aws_config = aws_config::load_from_env().await;
            let client = aws_sdk_dynamodb::Client::new(&aws_config);
            info!("Storing games in DynamoDB table {}", table);
            Arc::new(DynamoDbKvStore::new(client, table))
        }
        None => {
            info!("Storing games in memory");
            Arc::new(MemoryKvStore::new())
        }
    };

    let registry = BadgeRegistry::ensure(&default_achievements());
    let manager = GameManager::new(
        Arc::new(KvGameRepository::new(store)),
        Arc::new(LocalPlatform::new()),
        Arc::new(LoggingAchievementGranter::new(registry)),
        config,
    );

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        match run(&manager, command).await {
            Ok(output) => println!("{}", output),
            Err(e) => println!("{}", e.user_message()),
        }
    }

    Ok(())
}

async fn run(manager: &GameManager, command: Command) -> Result<String, GameError> {
    let game = match command {
        Command::Challenge { player, opponent } => {
            manager.create_game(&player, &opponent).await?.id().to_string()
        }
        Command::Move {
            game,
            player,
            notation,
        } => {
            let summary = manager.make_move(&game, &player, &notation).await?;
            info!("{} played {}", summary.played.mover, summary.played.san);
            game
        }
        Command::Resign { game, player } => {
            manager.resign(&game, &player).await?;
            game
        }
        Command::Offer { game, player } => {
            manager.offer_draw(&game, &player).await?;
            game
        }
        Command::Accept { game, player } => {
            manager.accept_draw(&game, &player).await?;
            game
        }
        Command::Claim { game, player } => {
            manager.claim_draw(&game, &player).await?;
            game
        }
        Command::Post { game } => game,
        Command::Board { game } => {
            let image = manager.board_image(&game, &Palette::default()).await?;
            return Ok(String::from_utf8_lossy(&image.bytes).into_owned());
        }
        Command::Pgn { game } => return manager.pgn(&game).await,
        Command::Help | Command::Quit => return Ok(HELP.to_string()),
    };

    let post = manager.refresh_announcement(&game).await?;
    let mut output = format!("[{}] {}\n{}", game, post.title, post.text);
    if let Some(footer) = post.footer {
        output.push_str(&format!("\n{}", footer));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("challenge alice bob", Command::Challenge { player: "alice".to_string(), opponent: "bob".to_string() })]
    #[case("move dm-1 alice e4", Command::Move { game: "dm-1".to_string(), player: "alice".to_string(), notation: "e4".to_string() })]
    #[case("  resign dm-1 bob ", Command::Resign { game: "dm-1".to_string(), player: "bob".to_string() })]
    #[case("pgn dm-1", Command::Pgn { game: "dm-1".to_string() })]
    #[case("", Command::Help)]
    #[case("exit", Command::Quit)]
    fn test_parse(#[case] line: &str, #[case] expected: Command) {
        assert_eq!(Command::parse(line), Ok(expected));
    }

    #[rstest]
    #[case("move dm-1 alice")]
    #[case("castle dm-1")]
    #[case("post")]
    fn test_parse_rejects(#[case] line: &str) {
        assert!(Command::parse(line).is_err());
    }

    #[tokio::test]
    async fn test_run_challenge_and_move() {
        let manager = GameManager::new(
            Arc::new(KvGameRepository::new(Arc::new(MemoryKvStore::new()))),
            Arc::new(LocalPlatform::new()),
            Arc::new(LoggingAchievementGranter::new(BadgeRegistry::default())),
            Config::default(),
        );

        let output = run(
            &manager,
            Command::parse("challenge alice bob").unwrap(),
        )
        .await
        .unwrap();
        assert!(output.starts_with("[alice__bob] Chess game\n"));
        assert!(output.ends_with("Turn: White"));

        let pgn = run(&manager, Command::parse("pgn alice__bob").unwrap())
            .await
            .unwrap();
        assert!(pgn.contains("[Result \"*\"]"));
    }
}
