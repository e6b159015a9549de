use crate::error::EngineError;
use crate::model::{IceCandidate, SessionDescription};
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineConnectionState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    LocalCandidate(IceCandidate),

    ConnectionStateChanged(EngineConnectionState),
}

/// Media engine capability: capture, codecs and transport live behind it.
///
/// Implementations push [`EngineEvent`]s into the sender they were built with.
#[async_trait]
pub trait PeerEngine: Send + Sync + 'static {
    async fn create_local_offer(&self) -> Result<SessionDescription, EngineError>;

    async fn create_local_answer(&self) -> Result<SessionDescription, EngineError>;

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), EngineError>;

    /// Must accept candidates in any order, including before the remote
    /// description is set.
    async fn add_candidate(&self, candidate: IceCandidate) -> Result<(), EngineError>;

    async fn close(&self) -> Result<(), EngineError>;
}
