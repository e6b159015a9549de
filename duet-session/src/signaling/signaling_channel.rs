use crate::signaling::publisher::{PublishReceipt, Publisher};
use crate::signaling::signal_listener::SignalListener;
use crate::signaling::signaling_config::SignalingConfig;
use duet_core::{
    CandidateRecord, CollectionSnapshot, Document, DocumentSnapshot, DocumentStore, IceCandidate,
    RecordType, Role, RoomId, RoomRecord, RoomSignal, StoreError, SubscriptionHandle,
};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Bridge between one room's records in the store and a [`SignalListener`].
///
/// Owns the room and candidate subscriptions; dropping the channel releases
/// them. No listener callback runs after [`SignalingChannel::close`] returns:
/// dispatch holds the read side of `alive` and `close` takes the write side.
pub struct SignalingChannel {
    room_id: RoomId,
    config: SignalingConfig,
    store: Arc<dyn DocumentStore>,
    listener: Arc<dyn SignalListener>,
    publisher: Publisher,
    alive: Arc<RwLock<bool>>,
    subscriptions: Mutex<Vec<SubscriptionHandle>>,
}

impl SignalingChannel {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        room_id: RoomId,
        config: SignalingConfig,
        listener: Arc<dyn SignalListener>,
    ) -> Self {
        let publisher = Publisher::spawn(store.clone());

        Self {
            room_id,
            config,
            store,
            listener,
            publisher,
            alive: Arc::new(RwLock::new(false)),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn is_open(&self) -> bool {
        *self.alive.read()
    }

    pub async fn fetch_room_record(&self) -> Result<Option<Document>, StoreError> {
        let path = self.config.paths.room_document(&self.room_id);
        self.store.get(&path).await
    }

    pub async fn current_record_type(&self) -> Result<Option<RecordType>, StoreError> {
        let record = self.fetch_room_record().await?;
        Ok(record.as_ref().and_then(RecordType::of_document))
    }

    /// Waits for the network path, then subscribes to the room record and its
    /// candidates. Calling it on an open channel does nothing.
    pub async fn open(&self) {
        {
            let mut open = self.alive.write();
            if *open {
                debug!("Signaling channel for room {} already open", self.room_id);
                return;
            }
            *open = true;
        }

        match self.store.enable_network().await {
            Ok(()) => {
                let open = self.alive.read();
                if *open {
                    info!("Store connection established for room {}", self.room_id);
                    self.listener.on_connection_established();
                }
            }
            Err(e) => warn!(
                "Store network not confirmed for room {}: {}. Relying on store reconnection.",
                self.room_id, e
            ),
        }

        let room_path = self.config.paths.room_document(&self.room_id);
        let room_handle = {
            let alive = self.alive.clone();
            let listener = self.listener.clone();
            let room_id = self.room_id.clone();
            self.store.subscribe(
                &room_path,
                Arc::new(move |snapshot: Result<DocumentSnapshot, StoreError>| {
                    dispatch_room_snapshot(&room_id, &alive, listener.as_ref(), snapshot);
                }),
            )
        };

        let candidates_path = self.config.paths.candidates(&self.room_id);
        let candidates_handle = {
            let alive = self.alive.clone();
            let listener = self.listener.clone();
            let room_id = self.room_id.clone();
            self.store.subscribe_collection(
                &candidates_path,
                Arc::new(move |snapshot: Result<CollectionSnapshot, StoreError>| {
                    dispatch_candidate_snapshot(&room_id, &alive, listener.as_ref(), snapshot);
                }),
            )
        };

        let mut subscriptions = self.subscriptions.lock();
        subscriptions.push(room_handle);
        subscriptions.push(candidates_handle);
        info!("Signaling channel opened for room {}", self.room_id);
    }

    pub fn publish_room_record(&self, record: &RoomRecord) -> PublishReceipt {
        let path = self.config.paths.room_document(&self.room_id);
        self.publisher
            .publish(path, record.to_document(), record.kind.as_str())
    }

    /// Stores a local candidate tagged with `role`. Under
    /// [`CandidateLayout::SingleSlot`](crate::CandidateLayout::SingleSlot)
    /// this replaces the previous candidate of the same role.
    pub fn publish_candidate(&self, candidate: &IceCandidate, role: Role) -> PublishReceipt {
        let tag = role.candidate_tag();
        let id = self.config.candidate_layout.document_id(tag);
        let path = self.config.paths.candidate_document(&self.room_id, &id);
        let record = CandidateRecord::new(candidate, tag);

        self.publisher.publish(path, record.to_document(), tag.as_str())
    }

    pub fn close(&self) {
        // Waits for any dispatch in flight.
        let was_open = std::mem::replace(&mut *self.alive.write(), false);

        let handles: Vec<SubscriptionHandle> = self.subscriptions.lock().drain(..).collect();
        for handle in handles {
            self.store.unsubscribe(handle);
        }

        if was_open {
            info!("Signaling channel closed for room {}", self.room_id);
        }
    }
}

impl Drop for SignalingChannel {
    fn drop(&mut self) {
        self.close();
    }
}

fn dispatch_room_snapshot(
    room_id: &RoomId,
    alive: &RwLock<bool>,
    listener: &dyn SignalListener,
    snapshot: Result<DocumentSnapshot, StoreError>,
) {
    let open = alive.read();
    if !*open {
        return;
    }

    let snapshot = match snapshot {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Room {} listener error: {}", room_id, e);
            return;
        }
    };

    let Some(data) = snapshot.data else {
        debug!("Room {} has no record yet", room_id);
        return;
    };

    match RoomSignal::classify(&data) {
        Ok(RoomSignal::Offer(description)) => {
            info!("Room {}: OFFER received", room_id);
            listener.on_offer_received(description);
        }
        Ok(RoomSignal::Answer(description)) => {
            info!("Room {}: ANSWER received", room_id);
            listener.on_answer_received(description);
        }
        Ok(RoomSignal::EndCall) => {
            info!("Room {}: END_CALL received", room_id);
            listener.on_call_ended();
        }
        Err(e) => warn!("Room {}: ignoring record: {}", room_id, e),
    }
}

fn dispatch_candidate_snapshot(
    room_id: &RoomId,
    alive: &RwLock<bool>,
    listener: &dyn SignalListener,
    snapshot: Result<CollectionSnapshot, StoreError>,
) {
    let snapshot = match snapshot {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Room {} candidate listener error: {}", room_id, e);
            return;
        }
    };

    for (path, document) in snapshot.documents {
        let open = alive.read();
        if !*open {
            return;
        }
        match CandidateRecord::from_document(&document) {
            Ok(record) => {
                debug!("Room {}: candidate {} received", room_id, path.id());
                listener.on_ice_candidate_received(record);
            }
            Err(e) => warn!("Room {}: skipping candidate {}: {}", room_id, path, e),
        }
    }
}
