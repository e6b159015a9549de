use duet_core::{CandidateTag, IceCandidate, RoomId};
use duet_session::{MemoryStore, NegotiationState};

use crate::integration::{connected_pair, init_tracing};
use crate::utils::{
    SETTLE_MS, STATE_TIMEOUT_MS, TestPeer, candidate, eventually, room, spawn_peer,
    wait_for_state, write_candidate, write_offer,
};

fn sorted(mut candidates: Vec<IceCandidate>) -> Vec<IceCandidate> {
    candidates.sort_by(|a, b| a.sdp.cmp(&b.sdp));
    candidates
}

#[tokio::test]
async fn test_own_candidates_are_not_applied() {
    init_tracing();

    let store = MemoryStore::new();
    let room_id = room("own-candidates");
    let (initiator, joiner) = connected_pair(&store, &room_id).await;

    assert_eq!(
        initiator.engine.remote_candidates(),
        vec![joiner.engine.local_candidate()]
    );
    assert_eq!(
        joiner.engine.remote_candidates(),
        vec![initiator.engine.local_candidate()]
    );
}

async fn joiner_with(store: &MemoryStore, room_id: &RoomId, candidates_first: bool) -> TestPeer {
    let a = candidate("a");
    let b = candidate("b");
    let joiner = spawn_peer(store, "joiner");
    joiner.session.start_as_joiner(room_id.clone()).await.unwrap();

    if candidates_first {
        write_candidate(store, room_id, "1", &a, CandidateTag::OfferCandidate).await;
        write_candidate(store, room_id, "2", &b, CandidateTag::OfferCandidate).await;
        write_offer(store, room_id, "v=0 offer from remote").await;
    } else {
        write_offer(store, room_id, "v=0 offer from remote").await;
        write_candidate(store, room_id, "2", &b, CandidateTag::OfferCandidate).await;
        write_candidate(store, room_id, "1", &a, CandidateTag::OfferCandidate).await;
    }

    joiner
}

#[tokio::test]
async fn test_candidate_order_does_not_matter() {
    init_tracing();

    let store = MemoryStore::new();
    let first = joiner_with(&store, &room("order-a"), true).await;
    let second = joiner_with(&store, &room("order-b"), false).await;

    for peer in [&first, &second] {
        wait_for_state(&peer.session, NegotiationState::Connected, STATE_TIMEOUT_MS)
            .await
            .unwrap();
        assert!(eventually(STATE_TIMEOUT_MS, || peer.engine.remote_candidates().len() == 2).await);
    }

    assert_eq!(
        sorted(first.engine.remote_candidates()),
        sorted(second.engine.remote_candidates())
    );
}

#[tokio::test]
async fn test_same_candidate_under_two_ids_is_applied_once() {
    init_tracing();

    let store = MemoryStore::new();
    let room_id = room("dup-candidate");
    let joiner = spawn_peer(&store, "joiner");
    joiner.session.start_as_joiner(room_id.clone()).await.unwrap();

    let c = candidate("same");
    write_candidate(&store, &room_id, "x", &c, CandidateTag::OfferCandidate).await;
    write_candidate(&store, &room_id, "y", &c, CandidateTag::OfferCandidate).await;

    assert!(eventually(STATE_TIMEOUT_MS, || !joiner.engine.remote_candidates().is_empty()).await);
    tokio::time::sleep(std::time::Duration::from_millis(SETTLE_MS)).await;
    assert_eq!(joiner.engine.remote_candidates(), vec![c]);
}
