use crate::negotiation::negotiation_command::SignalEvent;
use crate::signaling::SignalListener;
use duet_core::{CandidateRecord, SessionDescription};
use tokio::sync::mpsc;
use tracing::debug;

/// Hands channel callbacks over to the negotiation loop.
pub(crate) struct SignalRelay {
    tx: mpsc::UnboundedSender<SignalEvent>,
}

impl SignalRelay {
    pub(crate) fn new(tx: mpsc::UnboundedSender<SignalEvent>) -> Self {
        Self { tx }
    }

    fn forward(&self, event: SignalEvent) {
        if self.tx.send(event).is_err() {
            debug!("Negotiation loop is gone, dropping signal");
        }
    }
}

impl SignalListener for SignalRelay {
    fn on_connection_established(&self) {
        self.forward(SignalEvent::ConnectionEstablished);
    }

    fn on_offer_received(&self, description: SessionDescription) {
        self.forward(SignalEvent::OfferReceived(description));
    }

    fn on_answer_received(&self, description: SessionDescription) {
        self.forward(SignalEvent::AnswerReceived(description));
    }

    fn on_ice_candidate_received(&self, candidate: CandidateRecord) {
        self.forward(SignalEvent::IceCandidateReceived(candidate));
    }

    fn on_call_ended(&self) {
        self.forward(SignalEvent::CallEnded);
    }
}
