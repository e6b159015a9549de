use duet_session::{MemoryStore, NegotiationState, SessionEvent};
use serde_json::json;

use crate::integration::init_tracing;
use crate::utils::{
    STATE_TIMEOUT_MS, drain_events, room, spawn_peer, wait_for_state, write_offer,
    write_room_document,
};

fn document(value: serde_json::Value) -> duet_core::Document {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("not an object"),
    }
}

#[tokio::test]
async fn test_unrecognized_records_are_ignored() {
    init_tracing();

    let store = MemoryStore::new();
    let room_id = room("odd-records");
    let joiner = spawn_peer(&store, "joiner");
    joiner.session.start_as_joiner(room_id.clone()).await.unwrap();

    write_room_document(
        &store,
        &room_id,
        document(json!({ "type": "RENEGOTIATE", "sdp": "v=0 x" })),
    )
    .await;
    let events = drain_events(&joiner.session).await;
    write_room_document(&store, &room_id, document(json!({ "type": "OFFER" }))).await;
    let more = drain_events(&joiner.session).await;

    for event in events.iter().chain(more.iter()) {
        assert!(!matches!(event, SessionEvent::OfferReceived(_)));
    }
    assert_eq!(joiner.session.state(), NegotiationState::AwaitingOffer);
    assert_eq!(joiner.engine.answers_created(), 0);

    write_offer(&store, &room_id, "v=0 offer from remote").await;
    wait_for_state(&joiner.session, NegotiationState::AnswerSent, STATE_TIMEOUT_MS)
        .await
        .expect("a well-formed offer is still handled");
}
