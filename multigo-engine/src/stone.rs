use serde::{Deserialize, Serialize};
use std::fmt;

use crate::MAX_PLAYERS;

/// A player's stone color. Colors are numbered from 1 and double as seat numbers:
/// the player in seat `n` places stones of color `n`. Board cells use 0 for empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stone(u8);

impl Stone {
    pub const FIRST: Stone = Stone(1);

    pub fn from_int(v: u8) -> Option<Self> {
        (1..=MAX_PLAYERS).contains(&v).then_some(Stone(v))
    }

    /// Stone for a zero-based seat index.
    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index + 1).ok().and_then(Self::from_int)
    }

    pub fn to_int(self) -> u8 {
        self.0
    }

    /// Zero-based slot used by every per-player vector (prisoners, marks, scores).
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// The color that moves after this one in a room of `room_size` players.
    pub fn next(self, room_size: u8) -> Self {
        Stone(self.0 % room_size + 1)
    }

    pub fn name(self) -> &'static str {
        match self.0 {
            1 => "black",
            2 => "white",
            3 => "green",
            _ => "purple",
        }
    }
}

impl TryFrom<u8> for Stone {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Stone::from_int(v).ok_or_else(|| format!("invalid stone color: {v}"))
    }
}

impl From<Stone> for u8 {
    fn from(stone: Stone) -> u8 {
        stone.0
    }
}

impl fmt::Display for Stone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
