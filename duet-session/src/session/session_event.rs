use crate::negotiation::NegotiationState;
use duet_core::{EngineConnectionState, IceCandidate, SessionDescription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    LocalHangUp,
    RemoteHangUp,
}

/// Observable progress of a session, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The store confirmed its network path for the room.
    ConnectionEstablished,
    StateChanged(NegotiationState),
    OfferReceived(SessionDescription),
    AnswerReceived(SessionDescription),
    CandidateReceived(IceCandidate),
    EngineStateChanged(EngineConnectionState),
    /// A negotiation step failed; the session is still usable.
    NegotiationFailed(String),
    CallEnded(EndReason),
}
