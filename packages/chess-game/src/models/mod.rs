pub mod announcement;
pub mod board_render;
pub mod game_record;
pub mod outcome;
pub mod played_move;
pub mod position;
