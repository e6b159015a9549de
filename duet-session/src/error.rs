use duet_core::{EngineError, RecordType, Role, RoomId, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The room already carries a call; pick a fresh room id.
    #[error("room {0} is already in use ({kind})", kind = .1.as_str())]
    RoomOccupied(RoomId, RecordType),

    #[error("session already started as {0}")]
    AlreadyStarted(Role),

    #[error("session has ended")]
    Ended,

    #[error("negotiation task is no longer running")]
    Stopped,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}
