pub mod error;
pub mod negotiation;
pub mod session;
pub mod signaling;
pub mod store;
pub mod transport;

pub use error::SessionError;
pub use negotiation::{NegotiationController, NegotiationState};
pub use session::*;
pub use signaling::{CandidateLayout, PublishReceipt, SignalListener, SignalingChannel, SignalingConfig};
pub use store::MemoryStore;
pub use transport::{EngineConfig, IceServerConfig, WebRtcEngine};
