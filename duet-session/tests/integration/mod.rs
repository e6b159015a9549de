pub mod robustness_tests;
pub mod teardown_tests;

use tracing::Level;

use duet_core::RoomId;
use duet_session::{MemoryStore, NegotiationState};

use crate::utils::{STATE_TIMEOUT_MS, TestPeer, spawn_peer, wait_for_state};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Runs a full offer/answer exchange between two fresh peers in `room_id`.
pub async fn connected_pair(store: &MemoryStore, room_id: &RoomId) -> (TestPeer, TestPeer) {
    let initiator = spawn_peer(store, "initiator");
    let joiner = spawn_peer(store, "joiner");

    initiator
        .session
        .start_as_initiator(room_id.clone())
        .await
        .expect("initiator should start");
    joiner
        .session
        .start_as_joiner(room_id.clone())
        .await
        .expect("joiner should start");

    wait_for_state(&initiator.session, NegotiationState::Connected, STATE_TIMEOUT_MS)
        .await
        .expect("initiator not connected");
    wait_for_state(&joiner.session, NegotiationState::Connected, STATE_TIMEOUT_MS)
        .await
        .expect("joiner not connected");

    (initiator, joiner)
}
