use std::fmt;

/// Why an engine operation was refused. The snapshot is never modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoError {
    InvalidRoomSize(u8),
    InvalidBoardSize(u8),
    MalformedBoard,
    NotSeated,
    AlreadySeated,
    RoomFull,
    SeatsNotFilled,
    WrongStage,
    OutOfTurn,
    NotOnBoard,
    Overwrite,
    KoViolation,
    Suicide,
    Superko,
    EmptyPoint,
    MarkingMismatch,
}

/// Rule violations are ordinary refusals; precondition violations mean the caller
/// addressed the engine with something it should have checked first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    RuleViolation,
    PreconditionViolation,
}

impl GoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GoError::InvalidRoomSize(_)
            | GoError::InvalidBoardSize(_)
            | GoError::MalformedBoard
            | GoError::NotSeated => ErrorKind::PreconditionViolation,
            _ => ErrorKind::RuleViolation,
        }
    }

    pub fn is_rule_violation(&self) -> bool {
        self.kind() == ErrorKind::RuleViolation
    }
}

impl fmt::Display for GoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoError::InvalidRoomSize(n) => write!(f, "invalid room size: {n}"),
            GoError::InvalidBoardSize(n) => write!(f, "invalid board size: {n}"),
            GoError::MalformedBoard => write!(f, "malformed board"),
            GoError::NotSeated => write!(f, "player is not seated"),
            GoError::AlreadySeated => write!(f, "player is already seated"),
            GoError::RoomFull => write!(f, "room is full"),
            GoError::SeatsNotFilled => write!(f, "not every seat is filled"),
            GoError::WrongStage => write!(f, "not allowed at this stage"),
            GoError::OutOfTurn => write!(f, "out of turn"),
            GoError::NotOnBoard => write!(f, "not on board"),
            GoError::Overwrite => write!(f, "overwrite"),
            GoError::KoViolation => write!(f, "ko violation"),
            GoError::Suicide => write!(f, "suicide"),
            GoError::Superko => write!(f, "repeats an earlier position"),
            GoError::EmptyPoint => write!(f, "no stone at that point"),
            GoError::MarkingMismatch => write!(f, "players disagree on dead stones"),
        }
    }
}

impl std::error::Error for GoError {}
