use crate::error::ModelError;
use crate::model::description::SessionDescription;
use crate::model::path::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const TYPE_FIELD: &str = "type";
const SDP_FIELD: &str = "sdp";

/// Discriminator of the room record. Last write wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordType {
    Offer,
    Answer,
    EndCall,
}

impl RecordType {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::Offer => "OFFER",
            RecordType::Answer => "ANSWER",
            RecordType::EndCall => "END_CALL",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "OFFER" => Some(RecordType::Offer),
            "ANSWER" => Some(RecordType::Answer),
            "END_CALL" => Some(RecordType::EndCall),
            _ => None,
        }
    }

    /// Recognized `type` of a stored room document, if any.
    pub fn of_document(doc: &Document) -> Option<Self> {
        doc.get(TYPE_FIELD)
            .and_then(Value::as_str)
            .and_then(Self::from_wire)
    }
}

/// Room record as written to the store: `{ type, sdp? }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    #[serde(rename = "type")]
    pub kind: RecordType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp: Option<String>,
}

impl RoomRecord {
    pub fn offer(description: &SessionDescription) -> Self {
        Self {
            kind: RecordType::Offer,
            sdp: Some(description.sdp.clone()),
        }
    }

    pub fn answer(description: &SessionDescription) -> Self {
        Self {
            kind: RecordType::Answer,
            sdp: Some(description.sdp.clone()),
        }
    }

    pub fn end_call() -> Self {
        Self {
            kind: RecordType::EndCall,
            sdp: None,
        }
    }

    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert(
            TYPE_FIELD.to_owned(),
            Value::String(self.kind.as_str().to_owned()),
        );
        if let Some(sdp) = &self.sdp {
            doc.insert(SDP_FIELD.to_owned(), Value::String(sdp.clone()));
        }
        doc
    }
}

/// A room snapshot classified by its `type` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomSignal {
    Offer(SessionDescription),
    Answer(SessionDescription),
    EndCall,
}

impl RoomSignal {
    /// Branches strictly on `type`. Anything not one of the three known
    /// values is an error the caller is expected to log and drop.
    pub fn classify(doc: &Document) -> Result<Self, ModelError> {
        let kind = match doc.get(TYPE_FIELD) {
            Some(Value::String(s)) => s.as_str(),
            Some(other) => return Err(ModelError::UnknownType(other.to_string())),
            None => return Err(ModelError::MissingType),
        };
        let sdp = || doc.get(SDP_FIELD).and_then(Value::as_str).map(str::to_owned);

        match RecordType::from_wire(kind) {
            Some(RecordType::Offer) => sdp()
                .map(|s| RoomSignal::Offer(SessionDescription::offer(s)))
                .ok_or(ModelError::MissingSdp("OFFER")),
            Some(RecordType::Answer) => sdp()
                .map(|s| RoomSignal::Answer(SessionDescription::answer(s)))
                .ok_or(ModelError::MissingSdp("ANSWER")),
            Some(RecordType::EndCall) => Ok(RoomSignal::EndCall),
            None => Err(ModelError::UnknownType(kind.to_owned())),
        }
    }

    pub fn record_type(&self) -> RecordType {
        match self {
            RoomSignal::Offer(_) => RecordType::Offer,
            RoomSignal::Answer(_) => RecordType::Answer,
            RoomSignal::EndCall => RecordType::EndCall,
        }
    }
}
