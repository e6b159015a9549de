use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Field map of one stored document.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Slash-separated address of a single document, e.g. `calls/room1`.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct DocumentPath(String);

impl DocumentPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment.
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn parent(&self) -> Option<CollectionPath> {
        self.0
            .rsplit_once('/')
            .map(|(parent, _)| CollectionPath::new(parent))
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Address of a collection, e.g. `calls/room1/candidates`.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CollectionPath(String);

impl CollectionPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn document(&self, id: &str) -> DocumentPath {
        DocumentPath(format!("{}/{}", self.0, id))
    }

    /// True when `doc` is a direct child of this collection.
    pub fn contains(&self, doc: &DocumentPath) -> bool {
        doc.parent().is_some_and(|parent| &parent == self)
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a room's records live in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomPaths {
    root: CollectionPath,
    candidates: String,
}

impl RoomPaths {
    pub fn new(root: impl Into<String>, candidates: impl Into<String>) -> Self {
        Self {
            root: CollectionPath::new(root),
            candidates: candidates.into(),
        }
    }

    pub fn room_document(&self, room: &RoomId) -> DocumentPath {
        self.root.document(room.as_str())
    }

    pub fn candidates(&self, room: &RoomId) -> CollectionPath {
        CollectionPath(format!("{}/{}", self.room_document(room), self.candidates))
    }

    pub fn candidate_document(&self, room: &RoomId, id: &str) -> DocumentPath {
        self.candidates(room).document(id)
    }
}

impl Default for RoomPaths {
    fn default() -> Self {
        Self::new("calls", "candidates")
    }
}
