use duet_core::{RecordType, RoomRecord};
use duet_session::{
    EndReason, MemoryStore, NegotiationState, SessionConfig, SessionError, SessionEvent,
};
use std::time::Duration;

use crate::integration::init_tracing;
use crate::utils::{
    SETTLE_MS, STATE_TIMEOUT_MS, drain_events, room, room_record, room_record_type,
    spawn_peer_with, stored_candidates, wait_for_state, write_offer, write_room_document,
};

const SLOW_ENGINE: Duration = Duration::from_millis(300);
const HANG_UP_AFTER: Duration = Duration::from_millis(100);

#[tokio::test]
async fn test_end_call_while_answering_is_not_overwritten() {
    init_tracing();

    let store = MemoryStore::new();
    let room_id = room("hang-up-while-answering");
    let joiner = spawn_peer_with(&store, "joiner", SessionConfig::default(), |e| {
        e.with_delay(SLOW_ENGINE)
    });

    joiner.session.start_as_joiner(room_id.clone()).await.unwrap();
    write_offer(&store, &room_id, "v=0 offer from initiator").await;
    tokio::time::sleep(HANG_UP_AFTER).await;
    write_room_document(&store, &room_id, RoomRecord::end_call().to_document()).await;

    wait_for_state(&joiner.session, NegotiationState::Ended, STATE_TIMEOUT_MS)
        .await
        .expect("joiner should end");
    tokio::time::sleep(SLOW_ENGINE + Duration::from_millis(SETTLE_MS)).await;

    assert_eq!(room_record_type(&store, &room_id), Some(RecordType::EndCall));
    assert!(stored_candidates(&store, &room_id).is_empty());

    let events = drain_events(&joiner.session).await;
    assert!(!events.contains(&SessionEvent::StateChanged(NegotiationState::AnswerSent)));
    assert!(events.contains(&SessionEvent::CallEnded(EndReason::RemoteHangUp)));
}

#[tokio::test]
async fn test_end_call_while_offering_is_not_overwritten() {
    init_tracing();

    let store = MemoryStore::new();
    let room_id = room("hang-up-while-offering");
    let initiator = spawn_peer_with(&store, "initiator", SessionConfig::default(), |e| {
        e.with_delay(SLOW_ENGINE)
    });

    let (result, ()) = tokio::join!(
        initiator.session.start_as_initiator(room_id.clone()),
        async {
            tokio::time::sleep(HANG_UP_AFTER).await;
            write_room_document(&store, &room_id, RoomRecord::end_call().to_document()).await;
        }
    );

    assert!(matches!(result, Err(SessionError::Ended)));
    assert_eq!(initiator.session.state(), NegotiationState::Ended);
    assert!(initiator.engine.is_closed());

    tokio::time::sleep(Duration::from_millis(SETTLE_MS)).await;
    assert_eq!(room_record_type(&store, &room_id), Some(RecordType::EndCall));
}

#[tokio::test]
async fn test_rival_offer_while_offering_is_kept() {
    init_tracing();

    let store = MemoryStore::new();
    let room_id = room("rival-offer");
    let initiator = spawn_peer_with(&store, "initiator", SessionConfig::default(), |e| {
        e.with_delay(SLOW_ENGINE)
    });

    let (result, ()) = tokio::join!(
        initiator.session.start_as_initiator(room_id.clone()),
        async {
            tokio::time::sleep(HANG_UP_AFTER).await;
            write_offer(&store, &room_id, "v=0 rival").await;
        }
    );

    assert!(matches!(
        result,
        Err(SessionError::RoomOccupied(_, RecordType::Offer))
    ));
    assert_eq!(initiator.session.state(), NegotiationState::Idle);

    tokio::time::sleep(Duration::from_millis(SETTLE_MS)).await;
    let record = room_record(&store, &room_id).expect("rival record");
    assert_eq!(record.get("sdp").and_then(|v| v.as_str()), Some("v=0 rival"));
    assert!(stored_candidates(&store, &room_id).is_empty());
    assert_eq!(initiator.session.state(), NegotiationState::Idle);
}
