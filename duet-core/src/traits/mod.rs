mod document_store;
mod peer_engine;

pub use document_store::{
    CollectionListener, CollectionSnapshot, DocumentListener, DocumentSnapshot, DocumentStore,
    SubscriptionHandle,
};
pub use peer_engine::{EngineConnectionState, EngineEvent, PeerEngine};
