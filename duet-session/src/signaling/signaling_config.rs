use duet_core::{CandidateTag, RoomPaths};
use uuid::Uuid;

/// How local candidates are stored under the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CandidateLayout {
    /// One document per candidate, keyed `{tag}-{uuid}`. Every trickled
    /// candidate reaches the other side.
    #[default]
    AppendOnly,

    /// One document per role, keyed by the role tag and overwritten by each
    /// new candidate. Only the latest candidate per side survives.
    SingleSlot,
}

impl CandidateLayout {
    pub fn document_id(self, tag: CandidateTag) -> String {
        match self {
            CandidateLayout::AppendOnly => format!("{}-{}", tag, Uuid::new_v4()),
            CandidateLayout::SingleSlot => tag.as_str().to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignalingConfig {
    pub paths: RoomPaths,
    pub candidate_layout: CandidateLayout,
}
