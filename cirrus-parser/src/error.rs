use crate::MAX_PARAMETERS;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("there is no command in the message")]
    MissingCommand,
    #[error("too many parameters: {count} (limit: {MAX_PARAMETERS})")]
    TooManyParameters { count: usize },
    #[error("the origin is empty")]
    EmptyOrigin,
    #[error("invalid origin {origin:?}")]
    InvalidOrigin { origin: String },
    #[error("invalid command {command:?}")]
    InvalidCommand { command: String },
    #[error("invalid parameter {parameter:?}")]
    InvalidParameter { parameter: String },
}

impl ParsingError {
    /// Errors about the shape of a line (no command, too many parameters, ...),
    /// as opposed to an empty origin.
    pub fn is_format_error(&self) -> bool {
        !matches!(self, ParsingError::EmptyOrigin)
    }
}
