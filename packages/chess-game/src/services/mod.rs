pub mod achievement_service;
pub mod board_renderer;
pub mod chess_service;
pub mod errors;
pub mod game_manager;
pub mod platform;
