use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::error::SessionError;
use crate::negotiation::negotiation_command::{SessionCommand, SignalEvent};
use crate::negotiation::negotiation_state::NegotiationState;
use crate::negotiation::signal_relay::SignalRelay;
use crate::session::{EndReason, SessionConfig, SessionEvent};
use crate::signaling::SignalingChannel;
use duet_core::{
    CandidateRecord, DocumentStore, EngineConnectionState, EngineEvent, IceCandidate,
    PeerEngine, RecordType, Role, RoomId, RoomRecord, SessionDescription, StoreError,
};

/// Single writer of one session's negotiation state.
///
/// User commands, store signals and engine events are funnelled into one
/// loop, so every transition happens on this task and in arrival order.
pub struct NegotiationController {
    config: SessionConfig,
    store: Arc<dyn DocumentStore>,
    engine: Arc<dyn PeerEngine>,

    channel: Option<SignalingChannel>,
    role: Option<Role>,
    state: NegotiationState,

    /// Description this side published, used to recognize our own echo.
    local_description: Option<SessionDescription>,
    answer_applied: bool,
    engine_state: EngineConnectionState,
    applied_candidates: HashSet<IceCandidate>,

    command_rx: mpsc::Receiver<SessionCommand>,
    signal_rx: mpsc::UnboundedReceiver<SignalEvent>,
    signal_tx: mpsc::UnboundedSender<SignalEvent>,
    /// Signals pulled off `signal_rx` while a publish was pending.
    deferred: VecDeque<SignalEvent>,
    engine_rx: mpsc::Receiver<EngineEvent>,

    state_tx: watch::Sender<NegotiationState>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl NegotiationController {
    pub fn new(
        config: SessionConfig,
        store: Arc<dyn DocumentStore>,
        engine: Arc<dyn PeerEngine>,
        command_rx: mpsc::Receiver<SessionCommand>,
        engine_rx: mpsc::Receiver<EngineEvent>,
        state_tx: watch::Sender<NegotiationState>,
        event_tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();

        Self {
            config,
            store,
            engine,
            channel: None,
            role: None,
            state: NegotiationState::Idle,
            local_description: None,
            answer_applied: false,
            engine_state: EngineConnectionState::New,
            applied_candidates: HashSet::new(),
            command_rx,
            signal_rx,
            signal_tx,
            deferred: VecDeque::new(),
            engine_rx,
            state_tx,
            event_tx,
        }
    }

    pub async fn run(mut self) {
        info!("Negotiation loop started");

        loop {
            while let Some(signal) = self.deferred.pop_front() {
                self.handle_signal(signal).await;
            }

            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("Command channel closed. Shutting down session.");
                            break;
                        }
                    }
                }

                Some(signal) = self.signal_rx.recv() => {
                    self.handle_signal(signal).await;
                }

                Some(event) = self.engine_rx.recv() => {
                    self.handle_engine_event(event).await;
                }
            }
        }

        if !self.state.is_terminal() {
            self.release().await;
            self.transition(NegotiationState::Ended);
        }
        info!("Negotiation loop finished");
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::StartAsInitiator { room_id, reply } => {
                let result = self.start_as_initiator(room_id).await;
                let _ = reply.send(result);
            }

            SessionCommand::StartAsJoiner { room_id, reply } => {
                let result = self.start_as_joiner(room_id).await;
                let _ = reply.send(result);
            }

            SessionCommand::HangUp { reply } => {
                let result = self.hang_up().await;
                let _ = reply.send(result);
            }
        }
    }

    fn ensure_startable(&self) -> Result<(), SessionError> {
        match (self.state, self.role) {
            (NegotiationState::Ended, _) => Err(SessionError::Ended),
            (NegotiationState::Idle, _) => Ok(()),
            (_, Some(role)) => Err(SessionError::AlreadyStarted(role)),
            (_, None) => Err(SessionError::Ended),
        }
    }

    /// Keeps the open channel when retrying in the same room.
    fn channel_for(&mut self, room_id: &RoomId) -> SignalingChannel {
        match self.channel.take() {
            Some(channel) if channel.room_id() == room_id => channel,
            _ => SignalingChannel::new(
                self.store.clone(),
                room_id.clone(),
                self.config.signaling.clone(),
                Arc::new(SignalRelay::new(self.signal_tx.clone())),
            ),
        }
    }

    async fn start_as_initiator(&mut self, room_id: RoomId) -> Result<(), SessionError> {
        self.ensure_startable()?;
        let channel = self.channel_for(&room_id);

        match channel.current_record_type().await {
            Ok(None) => {}
            Ok(Some(kind)) => {
                warn!("Room {} already holds {}, refusing to start", room_id, kind.as_str());
                return Err(SessionError::RoomOccupied(room_id, kind));
            }
            Err(e) => {
                error!("Failed to read room {}: {}", room_id, e);
                return Err(e.into());
            }
        }

        info!("Starting as initiator in room {}", room_id);
        self.role = Some(Role::Initiator);
        channel.open().await;
        self.channel = Some(channel);
        self.transition(NegotiationState::CreatingOffer);

        let offer = match self.engine.create_local_offer().await {
            Ok(offer) => offer,
            Err(e) => {
                error!("Failed to create offer for room {}: {}", room_id, e);
                self.transition(NegotiationState::Idle);
                return Err(e.into());
            }
        };

        if self.call_end_pending() {
            info!("Room {} was hung up while the offer was being created", room_id);
            self.end(EndReason::RemoteHangUp).await;
            return Err(SessionError::Ended);
        }

        match self.room_record_type().await {
            Ok(None) => {}
            Ok(Some(RecordType::EndCall)) => {
                info!("Room {} was hung up while the offer was being created", room_id);
                self.end(EndReason::RemoteHangUp).await;
                return Err(SessionError::Ended);
            }
            Ok(Some(kind)) => {
                warn!("Room {} was taken by {} meanwhile, not publishing", room_id, kind.as_str());
                self.transition(NegotiationState::Idle);
                return Err(SessionError::RoomOccupied(room_id, kind));
            }
            Err(e) => warn!("Could not re-read room {} before publishing: {}", room_id, e),
        }

        if let Some(channel) = &self.channel {
            let _ = channel.publish_room_record(&RoomRecord::offer(&offer));
        }
        self.local_description = Some(offer);
        self.transition(NegotiationState::OfferSent);
        Ok(())
    }

    async fn start_as_joiner(&mut self, room_id: RoomId) -> Result<(), SessionError> {
        self.ensure_startable()?;
        let channel = self.channel_for(&room_id);

        info!("Joining room {}", room_id);
        self.role = Some(Role::Joiner);
        self.transition(NegotiationState::AwaitingOffer);
        channel.open().await;
        self.channel = Some(channel);
        Ok(())
    }

    async fn hang_up(&mut self) -> Result<(), SessionError> {
        if self.state.is_terminal() {
            debug!("Hang up after the call ended, nothing to do");
            return Ok(());
        }

        match &self.channel {
            Some(channel) => {
                info!("Hanging up room {}", channel.room_id());
                let _ = channel.publish_room_record(&RoomRecord::end_call());
            }
            None => debug!("Hang up before signaling started, nothing to publish"),
        }

        self.end(EndReason::LocalHangUp).await;
        Ok(())
    }

    async fn handle_signal(&mut self, signal: SignalEvent) {
        if self.state.is_terminal() {
            debug!("Dropping {:?} after the call ended", signal);
            return;
        }

        match signal {
            SignalEvent::ConnectionEstablished => self.emit(SessionEvent::ConnectionEstablished),
            SignalEvent::OfferReceived(offer) => self.on_offer_received(offer).await,
            SignalEvent::AnswerReceived(answer) => self.on_answer_received(answer).await,
            SignalEvent::IceCandidateReceived(record) => self.on_remote_candidate(record).await,
            SignalEvent::CallEnded => {
                info!("Remote side ended the call");
                self.end(EndReason::RemoteHangUp).await;
            }
        }
    }

    async fn on_offer_received(&mut self, offer: SessionDescription) {
        match (self.role, self.state) {
            (Some(Role::Joiner), NegotiationState::AwaitingOffer) => {}
            (Some(Role::Initiator), NegotiationState::OfferSent)
                if self.local_description.as_ref() == Some(&offer) =>
            {
                debug!("Own offer is visible in the store");
                self.transition(NegotiationState::AwaitingAnswer);
                return;
            }
            (Some(Role::Initiator), _) if self.local_description.as_ref() != Some(&offer) => {
                warn!("Ignoring a foreign offer while acting as initiator");
                return;
            }
            (_, state) => {
                debug!("Ignoring offer in state {}", state);
                return;
            }
        }

        self.emit(SessionEvent::OfferReceived(offer.clone()));
        self.transition(NegotiationState::OfferReceived);

        if let Err(e) = self.engine.set_remote_description(offer).await {
            error!("Failed to apply remote offer: {}", e);
            self.fail_step(e.to_string(), NegotiationState::AwaitingOffer);
            return;
        }

        self.transition(NegotiationState::CreatingAnswer);
        let answer = match self.engine.create_local_answer().await {
            Ok(answer) => answer,
            Err(e) => {
                error!("Failed to create answer: {}", e);
                self.fail_step(e.to_string(), NegotiationState::AwaitingOffer);
                return;
            }
        };

        let hung_up = self.call_end_pending()
            || matches!(self.room_record_type().await, Ok(Some(RecordType::EndCall)));
        if hung_up {
            info!("Call ended while the answer was being created, not publishing it");
            self.end(EndReason::RemoteHangUp).await;
            return;
        }
        if let Some(channel) = &self.channel {
            let _ = channel.publish_room_record(&RoomRecord::answer(&answer));
        }
        self.local_description = Some(answer);
        self.transition(NegotiationState::AnswerSent);
        self.connect_if_ready();
    }

    async fn on_answer_received(&mut self, answer: SessionDescription) {
        let expecting = self.role == Some(Role::Initiator)
            && !self.answer_applied
            && matches!(
                self.state,
                NegotiationState::OfferSent | NegotiationState::AwaitingAnswer
            );
        if !expecting {
            debug!("Ignoring answer in state {}", self.state);
            return;
        }

        // The echo of our offer may have been coalesced away.
        if self.state == NegotiationState::OfferSent {
            self.transition(NegotiationState::AwaitingAnswer);
        }
        self.emit(SessionEvent::AnswerReceived(answer.clone()));

        match self.engine.set_remote_description(answer).await {
            Ok(()) => {
                info!("Remote answer applied");
                self.answer_applied = true;
                self.connect_if_ready();
            }
            Err(e) => {
                error!("Failed to apply remote answer: {}", e);
                self.fail_step(e.to_string(), NegotiationState::AwaitingAnswer);
            }
        }
    }

    async fn on_remote_candidate(&mut self, record: CandidateRecord) {
        if Some(record.tag.role()) == self.role {
            debug!("Skipping own {} record", record.tag);
            return;
        }

        let candidate = record.candidate();
        if !self.applied_candidates.insert(candidate.clone()) {
            debug!("Candidate already applied: {}", candidate.sdp);
            return;
        }

        match self.engine.add_candidate(candidate.clone()).await {
            Ok(()) => self.emit(SessionEvent::CandidateReceived(candidate)),
            Err(e) => {
                warn!("Failed to add remote candidate: {}", e);
                self.applied_candidates.remove(&candidate);
            }
        }
    }

    async fn handle_engine_event(&mut self, event: EngineEvent) {
        if self.state.is_terminal() {
            debug!("Dropping engine event {:?} after the call ended", event);
            return;
        }

        match event {
            EngineEvent::LocalCandidate(candidate) => {
                if self.state == NegotiationState::Idle {
                    debug!("Local candidate while idle, dropping");
                    return;
                }
                let (Some(channel), Some(role)) = (&self.channel, self.role) else {
                    warn!("Local candidate before signaling started, dropping");
                    return;
                };
                let _ = channel.publish_candidate(&candidate, role);
            }

            EngineEvent::ConnectionStateChanged(state) => {
                info!("Engine connection state: {:?}", state);
                self.engine_state = state;
                self.emit(SessionEvent::EngineStateChanged(state));

                match state {
                    EngineConnectionState::Connected => self.connect_if_ready(),
                    EngineConnectionState::Failed | EngineConnectionState::Disconnected => {
                        warn!("Engine reports {:?}; waiting for hang up or recovery", state)
                    }
                    _ => {}
                }
            }
        }
    }

    /// Pulls every queued signal without handling it. Anything other than a
    /// call end is kept for the loop.
    fn call_end_pending(&mut self) -> bool {
        let mut ended = false;
        while let Ok(signal) = self.signal_rx.try_recv() {
            match signal {
                SignalEvent::CallEnded => ended = true,
                other => self.deferred.push_back(other),
            }
        }
        ended
    }

    async fn room_record_type(&self) -> Result<Option<RecordType>, StoreError> {
        match &self.channel {
            Some(channel) => channel.current_record_type().await,
            None => Ok(None),
        }
    }

    fn connect_if_ready(&mut self) {
        if self.engine_state != EngineConnectionState::Connected {
            return;
        }

        let ready = match self.state {
            NegotiationState::AwaitingAnswer => self.answer_applied,
            NegotiationState::AnswerSent => true,
            _ => false,
        };
        if ready {
            self.transition(NegotiationState::Connected);
        }
    }

    fn fail_step(&mut self, reason: String, fallback: NegotiationState) {
        self.emit(SessionEvent::NegotiationFailed(reason));
        self.transition(fallback);
    }

    /// Stops listening first so no signal arrives mid-teardown.
    async fn release(&mut self) {
        if let Some(channel) = self.channel.take() {
            channel.close();
        }
        if let Err(e) = self.engine.close().await {
            warn!("Failed to close engine: {}", e);
        }
    }

    async fn end(&mut self, reason: EndReason) {
        self.release().await;
        self.transition(NegotiationState::Ended);
        self.emit(SessionEvent::CallEnded(reason));
    }

    fn transition(&mut self, next: NegotiationState) {
        if self.state == next {
            return;
        }
        if !self.state.can_transition_to(next) {
            error!("Refusing transition {} -> {}", self.state, next);
            return;
        }

        info!("Negotiation {} -> {}", self.state, next);
        self.state = next;
        self.state_tx.send_replace(next);
        self.emit(SessionEvent::StateChanged(next));
    }

    fn emit(&self, event: SessionEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("No one is listening for session events");
        }
    }
}
