use cirrus_parser::ParsingError;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("client is already connected to a server")]
    AlreadyConnected,
    #[error("client is not connected to a server")]
    NotConnected,
    #[error("raw line contains a line break")]
    LineBreakInRaw,
    #[error(transparent)]
    Parsing(#[from] ParsingError),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("only one handler per command is allowed, {command:?} is registered twice")]
    DuplicateHandler { command: String },
    #[error("no handler is registered for \"default\"")]
    MissingDefaultHandler,
}
