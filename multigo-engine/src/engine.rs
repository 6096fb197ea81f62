use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::GoError;
use crate::goban::Goban;
use crate::ko::Ko;
use crate::stone::Stone;
use crate::territory::{self, Score};
use crate::turn::Turn;
use crate::zobrist::{self, ZobristTable};
use crate::{MAX_BOARD_SIZE, MAX_PLAYERS, MIN_BOARD_SIZE, MIN_PLAYERS, PlayerId, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Waiting,
    Playing,
    Scoring,
    Finished,
}

impl Stage {
    pub fn is_over(&self) -> bool {
        *self == Stage::Finished
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Waiting => write!(f, "waiting"),
            Stage::Playing => write!(f, "playing"),
            Stage::Scoring => write!(f, "scoring"),
            Stage::Finished => write!(f, "finished"),
        }
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(Stage::Waiting),
            "playing" => Ok(Stage::Playing),
            "scoring" => Ok(Stage::Scoring),
            "finished" => Ok(Stage::Finished),
            _ => Err(format!("unknown stage: {s}")),
        }
    }
}

/// Wire view of a match snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub board: Vec<u8>,
    pub size: u8,
    pub room_size: u8,
    pub players: Vec<PlayerId>,
    pub current_player: Stone,
    pub stage: Stage,
    pub prisoners: Vec<u32>,
    pub ko: Option<Ko>,
    pub hash: String,
    pub pass_count: u8,
    pub marked: Vec<Vec<Point>>,
    pub confirmed: Vec<PlayerId>,
    pub ownership: Option<Vec<u8>>,
    pub score: Option<Score>,
    pub resigned: Option<Stone>,
}

/// The canonical state of one match.
///
/// Every mutating method is all-or-nothing: on `Err` the snapshot is exactly as it was.
#[derive(Debug, Clone)]
pub struct Engine {
    table: Arc<ZobristTable>,
    room_size: u8,
    players: Vec<PlayerId>,
    goban: Goban,
    current: Stone,
    prisoners: Vec<u32>,
    ko: Option<Ko>,
    hash: u64,
    history: HashSet<u64>,
    moves: Vec<Turn>,
    pass_count: u8,
    marked: Vec<BTreeSet<Point>>,
    confirmed: Vec<PlayerId>,
    stage: Stage,
    score: Option<Score>,
    resigned: Option<Stone>,
}

impl Engine {
    /// A waiting match on an empty board, hashed with the process-wide table.
    pub fn new(room_size: u8, board_size: u8) -> Result<Self, GoError> {
        Self::with_table(ZobristTable::shared(), room_size, board_size)
    }

    pub fn with_table(
        table: Arc<ZobristTable>,
        room_size: u8,
        board_size: u8,
    ) -> Result<Self, GoError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&room_size) {
            return Err(GoError::InvalidRoomSize(room_size));
        }
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&board_size) || board_size > table.size() {
            return Err(GoError::InvalidBoardSize(board_size));
        }

        let hash = table.initial_hash(board_size);
        Ok(Engine {
            table,
            room_size,
            players: Vec::with_capacity(room_size as usize),
            goban: Goban::with_size(board_size),
            current: Stone::FIRST,
            prisoners: vec![0; room_size as usize],
            ko: None,
            hash,
            history: HashSet::from([hash]),
            moves: Vec::new(),
            pass_count: 0,
            marked: vec![BTreeSet::new(); room_size as usize],
            confirmed: Vec::new(),
            stage: Stage::Waiting,
            score: None,
            resigned: None,
        })
    }

    // -- Accessors --

    pub fn room_size(&self) -> u8 {
        self.room_size
    }

    pub fn board_size(&self) -> u8 {
        self.goban.size()
    }

    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    pub fn goban(&self) -> &Goban {
        &self.goban
    }

    pub fn board(&self) -> &[u8] {
        self.goban.board()
    }

    pub fn stone_at(&self, point: Point) -> Option<Stone> {
        self.goban.stone_at(point)
    }

    pub fn current_turn_stone(&self) -> Stone {
        self.current
    }

    /// Player id whose turn it is. `None` outside the playing stage.
    pub fn current_player(&self) -> Option<PlayerId> {
        if self.stage != Stage::Playing {
            return None;
        }
        self.players.get(self.current.index()).copied()
    }

    pub fn prisoners(&self) -> &[u32] {
        &self.prisoners
    }

    pub fn ko(&self) -> Option<&Ko> {
        self.ko.as_ref()
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn history(&self) -> &HashSet<u64> {
        &self.history
    }

    pub fn moves(&self) -> &[Turn] {
        &self.moves
    }

    pub fn pass_count(&self) -> u8 {
        self.pass_count
    }

    pub fn marked(&self, stone: Stone) -> Option<&BTreeSet<Point>> {
        self.marked.get(stone.index())
    }

    pub fn confirmed(&self) -> &[PlayerId] {
        &self.confirmed
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn score(&self) -> Option<&Score> {
        self.score.as_ref()
    }

    pub fn resigned(&self) -> Option<Stone> {
        self.resigned
    }

    pub fn table(&self) -> &Arc<ZobristTable> {
        &self.table
    }

    /// Color played by `player`, if seated.
    pub fn seat_of(&self, player: PlayerId) -> Option<Stone> {
        self.players
            .iter()
            .position(|&p| p == player)
            .and_then(Stone::from_index)
    }

    pub fn is_seated(&self, player: PlayerId) -> bool {
        self.players.contains(&player)
    }

    /// Territory owner of every point on the current board (0 for dame and stones).
    pub fn ownership(&self) -> Vec<u8> {
        territory::ownership(&self.goban)
    }

    // -- Seating --

    pub fn seat_player(&mut self, player: PlayerId) -> Result<Stone, GoError> {
        if self.stage != Stage::Waiting {
            return Err(GoError::WrongStage);
        }
        if self.is_seated(player) {
            return Err(GoError::AlreadySeated);
        }
        if self.players.len() >= self.room_size as usize {
            return Err(GoError::RoomFull);
        }

        self.players.push(player);
        Stone::from_index(self.players.len() - 1).ok_or(GoError::RoomFull)
    }

    pub fn unseat_player(&mut self, player: PlayerId) -> Result<(), GoError> {
        if self.stage != Stage::Waiting {
            return Err(GoError::WrongStage);
        }
        let seat = self
            .players
            .iter()
            .position(|&p| p == player)
            .ok_or(GoError::NotSeated)?;
        self.players.remove(seat);
        Ok(())
    }

    /// Start the match once every seat is filled. The board and all counters are reset.
    pub fn begin_play(&mut self) -> Result<(), GoError> {
        if self.stage != Stage::Waiting {
            return Err(GoError::WrongStage);
        }
        if self.players.len() != self.room_size as usize {
            return Err(GoError::SeatsNotFilled);
        }

        let size = self.goban.size();
        self.goban = Goban::with_size(size);
        self.hash = self.table.initial_hash(size);
        self.history = HashSet::from([self.hash]);
        self.current = Stone::FIRST;
        self.prisoners = vec![0; self.room_size as usize];
        self.ko = None;
        self.moves.clear();
        self.pass_count = 0;
        self.clear_marks();
        self.score = None;
        self.resigned = None;
        self.stage = Stage::Playing;
        Ok(())
    }

    // -- Move validation --

    /// Check stage, turn, target point and ko for `player` playing at `point`.
    /// Suicide and superko need the resolved board and are checked by `try_play`.
    pub fn validate_move(&self, player: PlayerId, point: Point) -> Result<Stone, GoError> {
        let stone = self.validate_turn(player)?;

        if !self.goban.on_board(point) {
            return Err(GoError::NotOnBoard);
        }
        if self.goban.cell(point) != 0 {
            return Err(GoError::Overwrite);
        }
        if let Some(ko) = &self.ko
            && ko.pos == point
            && ko.illegal == stone
        {
            return Err(GoError::KoViolation);
        }

        Ok(stone)
    }

    pub fn is_legal(&self, player: PlayerId, point: Point) -> bool {
        self.validate_move(player, point).is_ok()
    }

    fn validate_turn(&self, player: PlayerId) -> Result<Stone, GoError> {
        if self.stage != Stage::Playing {
            return Err(GoError::WrongStage);
        }
        let stone = self.seat_of(player).ok_or(GoError::NotSeated)?;
        if stone != self.current {
            return Err(GoError::OutOfTurn);
        }
        Ok(stone)
    }

    // -- Game actions --

    /// Place a stone for `player`. Returns the captured points.
    pub fn try_play(&mut self, player: PlayerId, point: Point) -> Result<Vec<Point>, GoError> {
        let stone = self.validate_move(player, point)?;
        let (goban, captured) = self.goban.place_stone(point, stone)?;

        let mut hash = self.table.toggle(self.hash, point, 0, stone.to_int());
        for &p in &captured {
            hash = self.table.toggle(hash, p, self.goban.cell(p), 0);
        }
        if zobrist::would_repeat(&self.history, hash) {
            return Err(GoError::Superko);
        }

        let next = self.current.next(self.room_size);
        self.goban = goban;
        self.hash = hash;
        self.history.insert(hash);
        self.prisoners[stone.index()] += captured.len() as u32;
        self.ko = match captured.as_slice() {
            [single] => Some(Ko {
                pos: *single,
                illegal: next,
            }),
            _ => None,
        };
        self.moves.push(Turn::Play {
            player,
            stone,
            point,
        });
        self.pass_count = 0;
        self.current = next;

        Ok(captured)
    }

    /// Pass the turn. Once every seat has passed in a row, the match moves to scoring.
    pub fn try_pass(&mut self, player: PlayerId) -> Result<Stage, GoError> {
        let stone = self.validate_turn(player)?;

        self.moves.push(Turn::Pass { player, stone });
        self.ko = None;
        self.pass_count += 1;
        self.current = self.current.next(self.room_size);

        if self.pass_count >= self.room_size {
            self.clear_marks();
            self.stage = Stage::Scoring;
        }
        Ok(self.stage)
    }

    /// Any seated player may resign while the match is in play, on or off turn.
    pub fn try_resign(&mut self, player: PlayerId) -> Result<Stage, GoError> {
        if self.stage != Stage::Playing {
            return Err(GoError::WrongStage);
        }
        let stone = self.seat_of(player).ok_or(GoError::NotSeated)?;

        self.moves.push(Turn::Resign { player, stone });
        self.resigned = Some(stone);
        self.ko = None;
        self.stage = Stage::Finished;
        Ok(self.stage)
    }

    // -- Scoring --

    /// Toggle the chain at `point` as dead in `player`'s marking. Clears all confirmations.
    pub fn toggle_mark(&mut self, player: PlayerId, point: Point) -> Result<(), GoError> {
        if self.stage != Stage::Scoring {
            return Err(GoError::WrongStage);
        }
        let stone = self.seat_of(player).ok_or(GoError::NotSeated)?;
        if !self.goban.on_board(point) {
            return Err(GoError::NotOnBoard);
        }

        let marked = &mut self.marked[stone.index()];
        if !territory::toggle_dead_chain(&self.goban, marked, point) {
            return Err(GoError::EmptyPoint);
        }
        self.confirmed.clear();
        Ok(())
    }

    /// Confirm the current marking, or retract an earlier confirmation.
    /// Confirming requires every player's marking to be identical; the last
    /// confirmation finishes the match.
    pub fn toggle_confirm(&mut self, player: PlayerId) -> Result<Stage, GoError> {
        if self.stage != Stage::Scoring {
            return Err(GoError::WrongStage);
        }
        if !self.is_seated(player) {
            return Err(GoError::NotSeated);
        }

        if let Some(i) = self.confirmed.iter().position(|&p| p == player) {
            self.confirmed.remove(i);
            return Ok(self.stage);
        }

        if !territory::markings_agree(&self.marked) {
            return Err(GoError::MarkingMismatch);
        }
        self.confirmed.push(player);

        if self.players.iter().all(|p| self.confirmed.contains(p)) {
            self.finish_game();
        }
        Ok(self.stage)
    }

    fn finish_game(&mut self) {
        let dead = self.marked.first().cloned().unwrap_or_default();
        territory::remove_dead_stones(&mut self.goban, &dead, &mut self.prisoners);

        self.hash = self.table.hash_board(&self.goban);
        self.history.insert(self.hash);
        self.score = Some(territory::score(&self.goban, &self.prisoners));
        self.stage = Stage::Finished;
    }

    fn clear_marks(&mut self) {
        for m in &mut self.marked {
            m.clear();
        }
        self.confirmed.clear();
    }

    // -- Serialization --

    pub fn game_state(&self) -> GameState {
        let ownership = matches!(self.stage, Stage::Scoring | Stage::Finished)
            .then(|| self.ownership());

        GameState {
            board: self.goban.board().to_vec(),
            size: self.goban.size(),
            room_size: self.room_size,
            players: self.players.clone(),
            current_player: self.current,
            stage: self.stage,
            prisoners: self.prisoners.clone(),
            ko: self.ko.clone(),
            hash: format!("{:016x}", self.hash),
            pass_count: self.pass_count,
            marked: self
                .marked
                .iter()
                .map(|m| m.iter().copied().collect())
                .collect(),
            confirmed: self.confirmed.clone(),
            ownership,
            score: self.score.clone(),
            resigned: self.resigned,
        }
    }
}
