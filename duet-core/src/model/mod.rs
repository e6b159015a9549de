mod candidate;
mod description;
mod path;
mod role;
mod room;
mod room_record;

pub use candidate::{CandidateRecord, IceCandidate};
pub use description::{SdpKind, SessionDescription};
pub use path::{CollectionPath, Document, DocumentPath, RoomPaths};
pub use role::{CandidateTag, Role};
pub use room::RoomId;
pub use room_record::{RecordType, RoomRecord, RoomSignal};
