use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MahjongError {
    /// Malformed tile text or an out-of-range suit/rank.
    InvalidTile { input: String, message: String },
    /// Concealed + meld tile count does not fit the 13/14-tile shape.
    InvalidHandSize { expected: String, actual: usize },
    /// Scoring was requested on a hand that is not a legal win.
    IncompleteHand,
    /// The pattern table has no catch-all entry (configuration defect).
    NoPatternMatched,
    /// A player-state mutation that the current state does not allow.
    InvalidState { message: String },
    /// Serializing/deserializing a rule set or result failed.
    Serialization { message: String },
}

impl fmt::Display for MahjongError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MahjongError::InvalidTile { input, message } => {
                write!(f, "Invalid tile '{}': {}", input, message)
            }
            MahjongError::InvalidHandSize { expected, actual } => {
                write!(
                    f,
                    "Invalid hand size: expected {} tiles, found {}",
                    expected, actual
                )
            }
            MahjongError::IncompleteHand => {
                write!(f, "Incomplete hand: not a legal winning configuration")
            }
            MahjongError::NoPatternMatched => {
                write!(f, "No fan pattern matched: table is missing its catch-all entry")
            }
            MahjongError::InvalidState { message } => {
                write!(f, "Invalid state: {}", message)
            }
            MahjongError::Serialization { message } => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for MahjongError {}

pub type MahjongResult<T> = Result<T, MahjongError>;

impl MahjongError {
    pub fn invalid_tile(input: impl Into<String>, message: impl Into<String>) -> Self {
        MahjongError::InvalidTile {
            input: input.into(),
            message: message.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        MahjongError::InvalidState {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for MahjongError {
    fn from(err: serde_json::Error) -> Self {
        MahjongError::Serialization {
            message: err.to_string(),
        }
    }
}
