use duet_core::{RecordType, RoomRecord};
use duet_session::{MemoryStore, NegotiationState, SessionError};

use crate::integration::init_tracing;
use crate::utils::{
    STATE_TIMEOUT_MS, room, room_record, spawn_peer, wait_for_state, write_offer,
    write_room_document,
};

#[tokio::test]
async fn test_room_with_offer_is_refused() {
    init_tracing();

    let store = MemoryStore::new();
    let room_id = room("busy");
    write_offer(&store, &room_id, "v=0 someone else").await;
    let before = room_record(&store, &room_id);

    let peer = spawn_peer(&store, "initiator");
    let result = peer.session.start_as_initiator(room_id.clone()).await;

    assert!(matches!(
        result,
        Err(SessionError::RoomOccupied(_, RecordType::Offer))
    ));
    assert_eq!(peer.session.state(), NegotiationState::Idle);
    assert_eq!(room_record(&store, &room_id), before);
    assert_eq!(peer.engine.offers_created(), 0);
}

#[tokio::test]
async fn test_ended_room_needs_a_fresh_id() {
    init_tracing();

    let store = MemoryStore::new();
    let room_id = room("finished");
    write_room_document(&store, &room_id, RoomRecord::end_call().to_document()).await;

    let peer = spawn_peer(&store, "initiator");
    let result = peer.session.start_as_initiator(room_id).await;
    assert!(matches!(
        result,
        Err(SessionError::RoomOccupied(_, RecordType::EndCall))
    ));

    // A refused start leaves the session usable.
    peer.session
        .start_as_initiator(duet_core::RoomId::generate())
        .await
        .expect("fresh room should be free");

    // The echo of our own offer moves us on from OFFER_SENT.
    wait_for_state(&peer.session, NegotiationState::AwaitingAnswer, STATE_TIMEOUT_MS)
        .await
        .unwrap();
}
