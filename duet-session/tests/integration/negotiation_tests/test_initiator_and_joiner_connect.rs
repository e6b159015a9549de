use duet_core::{CandidateTag, RecordType, SdpKind};
use duet_session::{
    CandidateLayout, MemoryStore, NegotiationState, SessionConfig, SessionEvent, SignalingConfig,
};

use crate::integration::{connected_pair, init_tracing};
use crate::utils::{
    STATE_TIMEOUT_MS, count_events, drain_events, room, room_record_type,
    spawn_peer_with, stored_candidates, wait_for_state,
};

#[tokio::test]
async fn test_initiator_and_joiner_connect() {
    init_tracing();

    let store = MemoryStore::new();
    let room_id = room("room1");
    let (initiator, joiner) = connected_pair(&store, &room_id).await;

    // Last write wins: the answer replaced the offer.
    assert_eq!(room_record_type(&store, &room_id), Some(RecordType::Answer));

    let offer = joiner.engine.remote_description().expect("joiner got offer");
    assert_eq!(offer.kind, SdpKind::Offer);
    assert_eq!(offer.sdp, "v=0 offer from initiator");

    let answer = initiator
        .engine
        .remote_description()
        .expect("initiator got answer");
    assert_eq!(answer.kind, SdpKind::Answer);

    let tags: Vec<CandidateTag> = stored_candidates(&store, &room_id)
        .into_iter()
        .map(|(_, record)| record.tag)
        .collect();
    assert!(tags.contains(&CandidateTag::OfferCandidate));
    assert!(tags.contains(&CandidateTag::AnswerCandidate));

    let events = drain_events(&joiner.session).await;
    assert_eq!(
        count_events(&events, |e| matches!(e, SessionEvent::OfferReceived(_))),
        1
    );
    assert_eq!(
        count_events(&events, |e| matches!(e, SessionEvent::ConnectionEstablished)),
        1
    );
    let joiner_states: Vec<NegotiationState> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::StateChanged(state) => Some(*state),
            _ => None,
        })
        .collect();
    assert_eq!(
        joiner_states,
        vec![
            NegotiationState::AwaitingOffer,
            NegotiationState::OfferReceived,
            NegotiationState::CreatingAnswer,
            NegotiationState::AnswerSent,
            NegotiationState::Connected,
        ]
    );
}

#[tokio::test]
async fn test_single_slot_layout_connects() {
    init_tracing();

    let store = MemoryStore::new();
    let room_id = room("room-single-slot");
    let config = SessionConfig {
        signaling: SignalingConfig {
            candidate_layout: CandidateLayout::SingleSlot,
            ..SignalingConfig::default()
        },
        ..SessionConfig::default()
    };

    let initiator = spawn_peer_with(&store, "initiator", config.clone(), |e| e);
    let joiner = spawn_peer_with(&store, "joiner", config, |e| e);

    initiator
        .session
        .start_as_initiator(room_id.clone())
        .await
        .unwrap();
    joiner.session.start_as_joiner(room_id.clone()).await.unwrap();

    wait_for_state(&initiator.session, NegotiationState::Connected, STATE_TIMEOUT_MS)
        .await
        .unwrap();
    wait_for_state(&joiner.session, NegotiationState::Connected, STATE_TIMEOUT_MS)
        .await
        .unwrap();

    let mut ids: Vec<String> = stored_candidates(&store, &room_id)
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["answerCandidate", "offerCandidate"]);
}
