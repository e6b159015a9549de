use crate::error::SessionError;
use duet_core::{CandidateRecord, RoomId, SessionDescription};
use tokio::sync::oneshot;

pub type CommandReply = oneshot::Sender<Result<(), SessionError>>;

/// User actions delivered to the negotiation loop.
#[derive(Debug)]
pub enum SessionCommand {
    StartAsInitiator { room_id: RoomId, reply: CommandReply },

    StartAsJoiner { room_id: RoomId, reply: CommandReply },

    HangUp { reply: CommandReply },
}

/// Store-side events relayed from the signaling channel.
#[derive(Debug, Clone)]
pub enum SignalEvent {
    ConnectionEstablished,
    OfferReceived(SessionDescription),
    AnswerReceived(SessionDescription),
    IceCandidateReceived(CandidateRecord),
    CallEnded,
}
