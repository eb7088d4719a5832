use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect: {0}")]
    Connect(String),
    #[error("failed to send: {0}")]
    Send(String),
}

#[derive(Debug, Error)]
pub enum RaceError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("connection is not open")]
    NotConnected,
}

/// Missing identity when entering a race. Callers send the user back to
/// room selection; nothing is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    #[error("room id is missing")]
    MissingRoomId,
    #[error("display name is missing")]
    MissingDisplayName,
}
