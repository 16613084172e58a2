pub mod game_repository_errors;
pub mod kv_store_errors;
