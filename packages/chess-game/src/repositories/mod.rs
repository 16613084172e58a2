pub mod errors;
pub mod game_repository;
pub mod kv_store;
