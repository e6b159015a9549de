use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, oneshot, watch};
use tracing::info;

use crate::error::SessionError;
use crate::negotiation::{CommandReply, NegotiationController, NegotiationState, SessionCommand};
use crate::session::session_config::SessionConfig;
use crate::session::session_event::SessionEvent;
use duet_core::{DocumentStore, EngineEvent, PeerEngine, RoomId};

pub const ENGINE_EVENT_BUFFER: usize = 256;

pub fn engine_event_channel() -> (mpsc::Sender<EngineEvent>, mpsc::Receiver<EngineEvent>) {
    mpsc::channel(ENGINE_EVENT_BUFFER)
}

/// Handle to one call. Dropping it stops the negotiation loop, closes the
/// engine and releases the store subscriptions without publishing END_CALL.
pub struct Session {
    command_tx: mpsc::Sender<SessionCommand>,
    state_rx: watch::Receiver<NegotiationState>,
    events: Mutex<mpsc::UnboundedReceiver<SessionEvent>>,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        store: Arc<dyn DocumentStore>,
        engine: Arc<dyn PeerEngine>,
        engine_events: mpsc::Receiver<EngineEvent>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer);
        let (state_tx, state_rx) = watch::channel(NegotiationState::Idle);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let controller = NegotiationController::new(
            config,
            store,
            engine,
            command_rx,
            engine_events,
            state_tx,
            event_tx,
        );
        tokio::spawn(controller.run());
        info!("Session created");

        Self {
            command_tx,
            state_rx,
            events: Mutex::new(event_rx),
        }
    }

    /// Fails with [`SessionError::RoomOccupied`] if the room already holds a
    /// record; nothing is written in that case.
    pub async fn start_as_initiator(&self, room_id: RoomId) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::StartAsInitiator { room_id, reply })
            .await
    }

    pub async fn start_as_joiner(&self, room_id: RoomId) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::StartAsJoiner { room_id, reply })
            .await
    }

    /// Publishes END_CALL and tears the session down. A no-op once ended.
    pub async fn hang_up(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::HangUp { reply }).await
    }

    pub fn state(&self) -> NegotiationState {
        *self.state_rx.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<NegotiationState> {
        self.state_rx.clone()
    }

    /// Resolves once the session reaches `target`. Fails with
    /// [`SessionError::Ended`] if the call ends first.
    pub async fn wait_for_state(&self, target: NegotiationState) -> Result<(), SessionError> {
        let mut rx = self.state_rx.clone();
        let reached = rx
            .wait_for(|state| *state == target || state.is_terminal())
            .await
            .map_err(|_| SessionError::Stopped)?;

        if *reached == target {
            Ok(())
        } else {
            Err(SessionError::Ended)
        }
    }

    pub async fn next_event(&self) -> Option<SessionEvent> {
        self.events.lock().await.recv().await
    }

    async fn request(
        &self,
        make: impl FnOnce(CommandReply) -> SessionCommand,
    ) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(make(reply))
            .await
            .map_err(|_| SessionError::Stopped)?;
        rx.await.map_err(|_| SessionError::Stopped)?
    }
}
