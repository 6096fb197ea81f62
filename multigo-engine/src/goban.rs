use arrayvec::ArrayVec;

use crate::error::GoError;
use crate::stone::Stone;
use crate::{MAX_BOARD_SIZE, MAX_PLAYERS, MIN_BOARD_SIZE, Point};

/// A square board stored as a flat row-major array (`y * size + x`).
/// Cells hold 0 for empty or a stone color `1..=MAX_PLAYERS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goban {
    board: Vec<u8>,
    size: u8,
}

impl Goban {
    /// Create a goban from a matrix of rows (`board[y][x]`). The matrix must be
    /// square, of a supported size, and hold only 0 or seat colors.
    pub fn new(board: Vec<Vec<u8>>) -> Result<Self, GoError> {
        let rows = board.len();
        let size = u8::try_from(rows)
            .ok()
            .filter(|size| (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(size))
            .ok_or_else(|| GoError::InvalidBoardSize(u8::try_from(rows).unwrap_or(u8::MAX)))?;

        if board.iter().any(|row| row.len() != rows) {
            return Err(GoError::MalformedBoard);
        }
        if board.iter().flatten().any(|&cell| cell > MAX_PLAYERS) {
            return Err(GoError::MalformedBoard);
        }

        Ok(Goban {
            board: board.into_iter().flatten().collect(),
            size,
        })
    }

    /// Create an empty board.
    pub fn with_size(size: u8) -> Self {
        Goban {
            board: vec![0u8; size as usize * size as usize],
            size,
        }
    }

    // -- Accessors --

    pub fn board(&self) -> &[u8] {
        &self.board
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    /// Raw cell value; 0 for empty and for points off the board.
    pub fn cell(&self, point: Point) -> u8 {
        if self.on_board(point) {
            self.board[self.idx(point)]
        } else {
            0
        }
    }

    pub fn stone_at(&self, point: Point) -> Option<Stone> {
        Stone::from_int(self.cell(point))
    }

    pub fn on_board(&self, (x, y): Point) -> bool {
        x < self.size && y < self.size
    }

    pub fn is_empty(&self) -> bool {
        self.board.iter().all(|&s| s == 0)
    }

    /// Every point on the board in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.size).flat_map(move |y| (0..self.size).map(move |x| (x, y)))
    }

    // -- Graph algorithms --

    /// The on-board orthogonal neighbors, in up, down, left, right order.
    pub fn neighbors(&self, (x, y): Point) -> ArrayVec<Point, 4> {
        let mut result = ArrayVec::new();
        if y > 0 {
            result.push((x, y - 1));
        }
        if y + 1 < self.size {
            result.push((x, y + 1));
        }
        if x > 0 {
            result.push((x - 1, y));
        }
        if x + 1 < self.size {
            result.push((x + 1, y));
        }
        result
    }

    /// Flood-fill every point connected to `point` through cells of the same value.
    /// Works for empty regions as well as stone chains.
    pub fn chain(&self, point: Point) -> Vec<Point> {
        if !self.on_board(point) {
            return Vec::new();
        }
        let mut visited = vec![false; self.board.len()];
        self.chain_from(point, &mut visited)
    }

    /// Chain flood-fill using a caller-owned visited bitset.
    pub(crate) fn chain_from(&self, point: Point, visited: &mut [bool]) -> Vec<Point> {
        let value = self.cell(point);
        let mut result = Vec::new();
        let mut stack = vec![point];

        while let Some(p) = stack.pop() {
            let vi = self.idx(p);
            if visited[vi] {
                continue;
            }
            visited[vi] = true;
            result.push(p);
            for n in self.neighbors(p) {
                if self.cell(n) == value && !visited[self.idx(n)] {
                    stack.push(n);
                }
            }
        }

        result
    }

    /// Whether a single point touches an empty cell.
    pub fn has_liberty(&self, point: Point) -> bool {
        self.neighbors(point).iter().any(|&n| self.cell(n) == 0)
    }

    /// Whether any member of a pre-computed chain touches an empty cell.
    pub fn chain_has_liberty(&self, chain: &[Point]) -> bool {
        chain.iter().any(|&p| self.has_liberty(p))
    }

    /// The distinct empty points adjacent to a chain.
    pub fn chain_liberties(&self, chain: &[Point]) -> Vec<Point> {
        let mut seen = vec![false; self.board.len()];
        let mut libs = Vec::new();
        for &p in chain {
            for n in self.neighbors(p) {
                let ni = self.idx(n);
                if !seen[ni] && self.cell(n) == 0 {
                    seen[ni] = true;
                    libs.push(n);
                }
            }
        }
        libs
    }

    // -- Move resolution --

    /// Place a stone on a copy of the board, resolve captures, and reject suicide.
    /// Returns the new board and the captured points. `self` is never modified.
    pub fn place_stone(&self, point: Point, stone: Stone) -> Result<(Goban, Vec<Point>), GoError> {
        if !self.on_board(point) {
            return Err(GoError::NotOnBoard);
        }

        if self.cell(point) != 0 {
            return Err(GoError::Overwrite);
        }

        let mut goban = self.clone();
        goban.set_stone(point, stone);

        let captured = goban.resolve_captures(point, stone);

        // A capture always frees at least one liberty for the placed chain.
        if captured.is_empty() && !goban.chain_has_liberty(&goban.chain(point)) {
            return Err(GoError::Suicide);
        }

        Ok((goban, captured))
    }

    /// Remove every opposing chain next to `point` that has no liberty left.
    ///
    /// Dead chains are all decided before any is removed, so with several opponents
    /// touching each other the result does not depend on neighbor order.
    pub fn resolve_captures(&mut self, point: Point, stone: Stone) -> Vec<Point> {
        let mut captured = Vec::new();
        let mut visited = vec![false; self.board.len()];

        for n in self.neighbors(point) {
            let value = self.cell(n);
            if value == 0 || value == stone.to_int() || visited[self.idx(n)] {
                continue;
            }
            let chain = self.chain_from(n, &mut visited);
            if !self.chain_has_liberty(&chain) {
                captured.extend(chain);
            }
        }

        for &p in &captured {
            self.clear_stone(p);
        }

        captured
    }

    // -- Internal helpers --

    #[inline]
    fn idx(&self, (x, y): Point) -> usize {
        y as usize * self.size as usize + x as usize
    }

    pub(crate) fn set_stone(&mut self, point: Point, stone: Stone) {
        if self.on_board(point) {
            let i = self.idx(point);
            self.board[i] = stone.to_int();
        }
    }

    pub(crate) fn clear_stone(&mut self, point: Point) {
        if self.on_board(point) {
            let i = self.idx(point);
            self.board[i] = 0;
        }
    }
}

/// Test helper: build a goban from an ASCII layout. '1'..'4' = stones, anything else = empty.
#[cfg(test)]
pub(crate) fn goban_from_layout(layout: &[&str]) -> Goban {
    let board: Vec<Vec<u8>> = layout
        .iter()
        .map(|row| {
            row.chars()
                .map(|c| c.to_digit(10).map(|d| d as u8).unwrap_or(0))
                .collect()
        })
        .collect();
    Goban::new(board).expect("test layout")
}
