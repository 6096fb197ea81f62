pub mod engine;
pub mod error;
pub mod goban;
pub mod ko;
pub mod stone;
pub mod territory;
pub mod turn;
pub mod zobrist;

/// A board coordinate as `(x, y)`, zero-indexed from the top-left corner.
pub type Point = (u8, u8);

/// Opaque identifier the room layer assigns to a connected player.
pub type PlayerId = u64;

pub const MIN_PLAYERS: u8 = 2;
pub const MAX_PLAYERS: u8 = 4;
pub const MIN_BOARD_SIZE: u8 = 5;
pub const MAX_BOARD_SIZE: u8 = 24;

pub use engine::{Engine, GameState, Stage};
pub use error::{ErrorKind, GoError};
pub use goban::Goban;
pub use ko::Ko;
pub use stone::Stone;
pub use territory::{PlayerPoints, Score};
pub use turn::Turn;
pub use zobrist::ZobristTable;
