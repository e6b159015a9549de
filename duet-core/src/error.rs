use thiserror::Error;

/// Errors produced while building or decoding model values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("room id must not be empty")]
    EmptyRoomId,

    #[error("room id '{0}' must not contain '/'")]
    InvalidRoomId(String),

    #[error("record has no 'type' field")]
    MissingType,

    #[error("unrecognized record type '{0}'")]
    UnknownType(String),

    #[error("{0} record carries no sdp")]
    MissingSdp(&'static str),

    #[error("malformed candidate record: {0}")]
    MalformedCandidate(String),
}

/// Failures reported by a remote document store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("document store is unavailable")]
    Unavailable,

    #[error("permission denied on '{0}'")]
    PermissionDenied(String),

    #[error("invalid store path '{0}'")]
    InvalidPath(String),

    #[error("document store error: {0}")]
    Other(String),
}

/// Failures reported by the media engine while negotiating.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to create session description: {0}")]
    CreateDescription(String),

    #[error("failed to apply session description: {0}")]
    ApplyDescription(String),

    #[error("failed to apply candidate: {0}")]
    Candidate(String),

    #[error("engine is closed")]
    Closed,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
