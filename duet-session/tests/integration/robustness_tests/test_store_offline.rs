use duet_core::StoreError;
use duet_session::{MemoryStore, NegotiationState, SessionError};

use crate::integration::init_tracing;
use crate::utils::{STATE_TIMEOUT_MS, room, spawn_peer, wait_for_state};

#[tokio::test]
async fn test_sessions_recover_when_store_comes_back() {
    init_tracing();

    let store = MemoryStore::new();
    let room_id = room("offline");
    let initiator = spawn_peer(&store, "initiator");
    let joiner = spawn_peer(&store, "joiner");

    store.set_online(false);

    let refused = initiator.session.start_as_initiator(room_id.clone()).await;
    assert!(matches!(
        refused,
        Err(SessionError::Store(StoreError::Unavailable))
    ));
    assert_eq!(initiator.session.state(), NegotiationState::Idle);

    joiner
        .session
        .start_as_joiner(room_id.clone())
        .await
        .expect("joining does not need the network up front");
    assert_eq!(joiner.session.state(), NegotiationState::AwaitingOffer);

    store.set_online(true);
    initiator
        .session
        .start_as_initiator(room_id)
        .await
        .expect("room is readable again");

    wait_for_state(&initiator.session, NegotiationState::Connected, STATE_TIMEOUT_MS)
        .await
        .unwrap();
    wait_for_state(&joiner.session, NegotiationState::Connected, STATE_TIMEOUT_MS)
        .await
        .unwrap();
}
