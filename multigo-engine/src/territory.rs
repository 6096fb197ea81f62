use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::Point;
use crate::goban::Goban;
use crate::stone::Stone;

/// Owner of an empty region: the single color bordering it, or `None` when the region
/// borders several colors (dame) or no stones at all.
pub fn region_owner(goban: &Goban, region: &[Point]) -> Option<Stone> {
    let mut owner: Option<u8> = None;
    for &p in region {
        for n in goban.neighbors(p) {
            let value = goban.cell(n);
            if value == 0 {
                continue;
            }
            match owner {
                None => owner = Some(value),
                Some(o) if o != value => return None,
                Some(_) => {}
            }
        }
    }
    owner.and_then(Stone::from_int)
}

/// Territory ownership for every point (same layout as `goban.board()`).
///
/// Empty points get the color of their region's owner, or 0 for dame.
/// Points holding stones are 0.
pub fn ownership(goban: &Goban) -> Vec<u8> {
    let mut result = vec![0u8; goban.board().len()];
    let mut visited = vec![false; goban.board().len()];
    let size = goban.size() as usize;

    for point in goban.points() {
        let idx = point.1 as usize * size + point.0 as usize;
        if visited[idx] || goban.cell(point) != 0 {
            continue;
        }

        let region = goban.chain_from(point, &mut visited);
        let owner = region_owner(goban, &region).map_or(0, Stone::to_int);
        for (x, y) in region {
            result[y as usize * size + x as usize] = owner;
        }
    }

    result
}

/// Toggle the chain at `point` in a player's dead-stone set.
///
/// If every stone of the chain is already marked, the whole chain is unmarked;
/// otherwise the whole chain is marked. Returns `false` (and changes nothing) when
/// the point is empty.
pub fn toggle_dead_chain(goban: &Goban, marked: &mut BTreeSet<Point>, point: Point) -> bool {
    if goban.stone_at(point).is_none() {
        return false;
    }

    let chain = goban.chain(point);
    if chain.iter().all(|pt| marked.contains(pt)) {
        for pt in &chain {
            marked.remove(pt);
        }
    } else {
        marked.extend(chain);
    }
    true
}

/// Whether every player has marked exactly the same set of dead stones.
pub fn markings_agree(marked: &[BTreeSet<Point>]) -> bool {
    match marked.split_first() {
        Some((first, rest)) => rest.iter().all(|m| m == first),
        None => true,
    }
}

/// Remove the agreed dead stones and credit prisoners.
///
/// Each removed stone is credited to the single color bordering the empty region it
/// ends up in, unless that color is the stone's own. Returns the number of stones removed.
pub fn remove_dead_stones(goban: &mut Goban, dead: &BTreeSet<Point>, prisoners: &mut [u32]) -> usize {
    let removed: Vec<(Point, Stone)> = dead
        .iter()
        .filter_map(|&p| goban.stone_at(p).map(|s| (p, s)))
        .collect();

    for &(p, _) in &removed {
        goban.clear_stone(p);
    }

    let owners = ownership(goban);
    let size = goban.size() as usize;
    for &((x, y), stone) in &removed {
        let owner = owners[y as usize * size + x as usize];
        if let Some(owner) = Stone::from_int(owner)
            && owner != stone
            && let Some(count) = prisoners.get_mut(owner.index())
        {
            *count += 1;
        }
    }

    removed.len()
}

/// Per-player score breakdown: territory (empty points owned) and prisoners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerPoints {
    pub territory: u32,
    pub prisoners: u32,
}

impl PlayerPoints {
    pub fn total(&self) -> u32 {
        self.territory + self.prisoners
    }
}

/// Final score: dame count plus one breakdown per seat (index = color - 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub dame: u32,
    pub players: Vec<PlayerPoints>,
}

impl Score {
    pub fn totals(&self) -> Vec<u32> {
        self.players.iter().map(PlayerPoints::total).collect()
    }

    /// Colors with the highest total; more than one on a tie.
    pub fn leaders(&self) -> Vec<Stone> {
        let best = self.players.iter().map(PlayerPoints::total).max();
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| Some(p.total()) == best)
            .filter_map(|(i, _)| Stone::from_index(i))
            .collect()
    }
}

/// Count territory on a board whose dead stones have already been removed.
pub fn score(goban: &Goban, prisoners: &[u32]) -> Score {
    let mut players: Vec<PlayerPoints> = prisoners
        .iter()
        .map(|&p| PlayerPoints {
            territory: 0,
            prisoners: p,
        })
        .collect();
    let mut dame = 0;

    for (i, &owner) in ownership(goban).iter().enumerate() {
        if goban.board()[i] != 0 {
            continue;
        }
        match Stone::from_int(owner).and_then(|s| players.get_mut(s.index())) {
            Some(p) => p.territory += 1,
            None => dame += 1,
        }
    }

    Score { dame, players }
}
