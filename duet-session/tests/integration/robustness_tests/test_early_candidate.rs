use duet_core::CandidateTag;
use duet_session::{MemoryStore, NegotiationState, SessionEvent};

use crate::integration::init_tracing;
use crate::utils::{
    STATE_TIMEOUT_MS, candidate, drain_events, eventually, room, spawn_peer, stored_candidates,
    wait_for_state, write_candidate, write_offer,
};

#[tokio::test]
async fn test_candidate_before_offer_is_forwarded() {
    init_tracing();

    let store = MemoryStore::new();
    let room_id = room("early");
    let early = candidate("initiator-host");
    write_candidate(&store, &room_id, "c1", &early, CandidateTag::OfferCandidate).await;

    let joiner = spawn_peer(&store, "joiner");
    joiner.session.start_as_joiner(room_id.clone()).await.unwrap();

    assert!(eventually(STATE_TIMEOUT_MS, || joiner.engine.remote_candidates() == vec![early.clone()]).await);
    assert_eq!(joiner.session.state(), NegotiationState::AwaitingOffer);
    let events = drain_events(&joiner.session).await;
    assert!(events.contains(&SessionEvent::CandidateReceived(early.clone())));

    write_offer(&store, &room_id, "v=0 offer from remote").await;

    wait_for_state(&joiner.session, NegotiationState::Connected, STATE_TIMEOUT_MS)
        .await
        .expect("joiner should connect once the offer arrives");

    let published = stored_candidates(&store, &room_id);
    assert!(
        published
            .iter()
            .any(|(_, record)| record.tag == CandidateTag::AnswerCandidate)
    );
}
