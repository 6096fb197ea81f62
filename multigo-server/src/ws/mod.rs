pub mod game_channel;
pub mod handler;
pub mod registry;
