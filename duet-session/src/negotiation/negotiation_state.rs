use std::fmt;

/// Where a session is in the offer/answer handshake.
///
/// Initiator: `Idle → CreatingOffer → OfferSent → AwaitingAnswer → Connected`.
/// Joiner: `Idle → AwaitingOffer → OfferReceived → CreatingAnswer → AnswerSent → Connected`.
/// Every non-terminal state may move to `Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NegotiationState {
    Idle,
    CreatingOffer,
    OfferSent,
    AwaitingAnswer,
    AwaitingOffer,
    OfferReceived,
    CreatingAnswer,
    AnswerSent,
    Connected,
    Ended,
}

impl NegotiationState {
    pub fn is_terminal(self) -> bool {
        self == NegotiationState::Ended
    }

    pub fn can_transition_to(self, next: NegotiationState) -> bool {
        use NegotiationState::*;

        match (self, next) {
            (Ended, _) => false,
            (_, Ended) => true,

            (Idle, CreatingOffer)
            | (CreatingOffer, OfferSent)
            | (CreatingOffer, Idle)
            | (OfferSent, AwaitingAnswer)
            | (AwaitingAnswer, Connected) => true,

            (Idle, AwaitingOffer)
            | (AwaitingOffer, OfferReceived)
            | (OfferReceived, CreatingAnswer)
            | (OfferReceived, AwaitingOffer)
            | (CreatingAnswer, AnswerSent)
            | (CreatingAnswer, AwaitingOffer)
            | (AnswerSent, Connected) => true,

            _ => false,
        }
    }
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NegotiationState::Idle => "IDLE",
            NegotiationState::CreatingOffer => "CREATING_OFFER",
            NegotiationState::OfferSent => "OFFER_SENT",
            NegotiationState::AwaitingAnswer => "AWAITING_ANSWER",
            NegotiationState::AwaitingOffer => "AWAITING_OFFER",
            NegotiationState::OfferReceived => "OFFER_RECEIVED",
            NegotiationState::CreatingAnswer => "CREATING_ANSWER",
            NegotiationState::AnswerSent => "ANSWER_SENT",
            NegotiationState::Connected => "CONNECTED",
            NegotiationState::Ended => "ENDED",
        };
        f.write_str(name)
    }
}
