use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, LazyLock};

use sha2::{Digest, Sha256};

use crate::goban::Goban;
use crate::{MAX_BOARD_SIZE, MAX_PLAYERS, Point};

/// Number of per-cell states: empty plus one per possible player color.
const STATES: usize = MAX_PLAYERS as usize + 1;

static SHARED: LazyLock<Arc<ZobristTable>> =
    LazyLock::new(|| Arc::new(ZobristTable::new(MAX_BOARD_SIZE)));

/// Per-cell, per-state hash contributions for incremental whole-board fingerprints.
///
/// Entries are derived from SHA-256 of `x{x}y{y}s{state}`, so every table built for the
/// same size is identical across processes. A table is never mutated after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct ZobristTable {
    size: u8,
    entries: Vec<u64>,
}

impl ZobristTable {
    pub fn new(size: u8) -> Self {
        let mut entries = Vec::with_capacity(size as usize * size as usize * STATES);
        for y in 0..size {
            for x in 0..size {
                for state in 0..STATES as u8 {
                    entries.push(digest_entry(x, y, state));
                }
            }
        }
        ZobristTable { size, entries }
    }

    /// The process-wide table, built on first use for the largest supported board.
    pub fn shared() -> Arc<ZobristTable> {
        Arc::clone(&SHARED)
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    /// Contribution of `point` holding `state` (0 = empty, otherwise a stone color).
    pub fn entry(&self, (x, y): Point, state: u8) -> u64 {
        let cell = y as usize * self.size as usize + x as usize;
        self.entries[cell * STATES + state as usize]
    }

    /// Hash of an empty board of the given size.
    pub fn initial_hash(&self, board_size: u8) -> u64 {
        let mut hash = 0;
        for y in 0..board_size {
            for x in 0..board_size {
                hash ^= self.entry((x, y), 0);
            }
        }
        hash
    }

    /// From-scratch hash of a whole board, empties included.
    pub fn hash_board(&self, goban: &Goban) -> u64 {
        goban
            .points()
            .fold(0, |hash, p| hash ^ self.entry(p, goban.cell(p)))
    }

    /// Swap the contribution of `point` from one state to another.
    pub fn toggle(&self, hash: u64, point: Point, from: u8, to: u8) -> u64 {
        hash ^ self.entry(point, from) ^ self.entry(point, to)
    }
}

impl fmt::Debug for ZobristTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZobristTable")
            .field("size", &self.size)
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Positional superko: true if `hash` matches any position reached so far in the game.
pub fn would_repeat(history: &HashSet<u64>, hash: u64) -> bool {
    history.contains(&hash)
}

fn digest_entry(x: u8, y: u8, state: u8) -> u64 {
    let digest = Sha256::digest(format!("x{x}y{y}s{state}").as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}
