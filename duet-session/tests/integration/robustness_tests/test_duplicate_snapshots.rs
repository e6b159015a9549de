use duet_core::{RoomPaths, RoomRecord, SessionDescription};
use duet_session::{MemoryStore, NegotiationState, SessionEvent};

use crate::integration::init_tracing;
use crate::utils::{
    STATE_TIMEOUT_MS, count_events, drain_events, room, spawn_peer, wait_for_state,
    write_offer, write_room_document,
};

#[tokio::test]
async fn test_redelivered_answer_is_applied_once() {
    init_tracing();

    let store = MemoryStore::new();
    let room_id = room("dup-answer");
    let initiator = spawn_peer(&store, "initiator");

    initiator
        .session
        .start_as_initiator(room_id.clone())
        .await
        .unwrap();
    wait_for_state(&initiator.session, NegotiationState::AwaitingAnswer, STATE_TIMEOUT_MS)
        .await
        .unwrap();

    let answer = RoomRecord::answer(&SessionDescription::answer("v=0 answer from remote"));
    write_room_document(&store, &room_id, answer.to_document()).await;

    let path = RoomPaths::default().room_document(&room_id);
    for _ in 0..3 {
        store.replay(&path);
    }

    let events = drain_events(&initiator.session).await;
    assert_eq!(
        count_events(&events, |e| matches!(e, SessionEvent::AnswerReceived(_))),
        1
    );
    // No remote candidate yet, so the mock engine does not connect.
    assert_eq!(initiator.session.state(), NegotiationState::AwaitingAnswer);
}

#[tokio::test]
async fn test_rewritten_offer_is_answered_once() {
    init_tracing();

    let store = MemoryStore::new();
    let room_id = room("dup-offer");
    let joiner = spawn_peer(&store, "joiner");

    joiner.session.start_as_joiner(room_id.clone()).await.unwrap();
    write_offer(&store, &room_id, "v=0 offer from remote").await;
    wait_for_state(&joiner.session, NegotiationState::AnswerSent, STATE_TIMEOUT_MS)
        .await
        .unwrap();

    write_offer(&store, &room_id, "v=0 offer from remote").await;
    store.replay(&RoomPaths::default().room_document(&room_id));

    let events = drain_events(&joiner.session).await;
    assert_eq!(
        count_events(&events, |e| matches!(e, SessionEvent::OfferReceived(_))),
        1
    );
    assert_eq!(joiner.engine.answers_created(), 1);
    assert_eq!(joiner.session.state(), NegotiationState::AnswerSent);
}
