use serde::{Deserialize, Serialize};

use crate::stone::Stone;
use crate::{PlayerId, Point};

/// One accepted action in a match. The engine only ever appends these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Turn {
    Play {
        player: PlayerId,
        stone: Stone,
        point: Point,
    },
    Pass {
        player: PlayerId,
        stone: Stone,
    },
    Resign {
        player: PlayerId,
        stone: Stone,
    },
}

impl Turn {
    pub fn player(&self) -> PlayerId {
        match *self {
            Turn::Play { player, .. } | Turn::Pass { player, .. } | Turn::Resign { player, .. } => {
                player
            }
        }
    }

    pub fn stone(&self) -> Stone {
        match *self {
            Turn::Play { stone, .. } | Turn::Pass { stone, .. } | Turn::Resign { stone, .. } => {
                stone
            }
        }
    }

    /// Board point for plays; `None` for passes and resignations.
    pub fn point(&self) -> Option<Point> {
        match *self {
            Turn::Play { point, .. } => Some(point),
            _ => None,
        }
    }
}
