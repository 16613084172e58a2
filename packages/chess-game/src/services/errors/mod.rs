pub mod achievement_service_errors;
pub mod board_renderer_errors;
pub mod chess_service_errors;
pub mod game_manager_errors;
pub mod platform_errors;
