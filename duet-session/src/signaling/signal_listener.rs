use duet_core::{CandidateRecord, SessionDescription};

/// Typed events decoded from room and candidate snapshots.
///
/// Called from the store's delivery tasks, concurrently with everything
/// else; implementations must hand the event off rather than block.
pub trait SignalListener: Send + Sync + 'static {
    /// The store's network path is live.
    fn on_connection_established(&self);

    fn on_offer_received(&self, description: SessionDescription);

    fn on_answer_received(&self, description: SessionDescription);

    /// Carries the record's role tag so the receiver can tell its own
    /// candidates from the remote side's.
    fn on_ice_candidate_received(&self, candidate: CandidateRecord);

    fn on_call_ended(&self);
}
