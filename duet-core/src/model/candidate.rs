use crate::error::ModelError;
use crate::model::path::Document;
use crate::model::role::CandidateTag;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A network path the engine discovered (local) or must try (remote).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IceCandidate {
    pub server_url: Option<String>,
    pub sdp_mid: String,
    pub sdp_m_line_index: u16,
    pub sdp: String,
}

/// Candidate as stored under `calls/{room}/candidates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    #[serde(rename = "serverUrl", default)]
    pub server_url: Option<String>,
    #[serde(rename = "sdpMid")]
    pub sdp_mid: String,
    #[serde(rename = "sdpMLineIndex")]
    pub sdp_m_line_index: u16,
    #[serde(rename = "sdpCandidate")]
    pub sdp_candidate: String,
    #[serde(rename = "type")]
    pub tag: CandidateTag,
}

impl CandidateRecord {
    pub fn new(candidate: &IceCandidate, tag: CandidateTag) -> Self {
        Self {
            server_url: candidate.server_url.clone(),
            sdp_mid: candidate.sdp_mid.clone(),
            sdp_m_line_index: candidate.sdp_m_line_index,
            sdp_candidate: candidate.sdp.clone(),
            tag,
        }
    }

    pub fn from_document(doc: &Document) -> Result<Self, ModelError> {
        serde_json::from_value(Value::Object(doc.clone()))
            .map_err(|e| ModelError::MalformedCandidate(e.to_string()))
    }

    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert(
            "serverUrl".to_owned(),
            self.server_url
                .as_ref()
                .map_or(Value::Null, |url| Value::String(url.clone())),
        );
        doc.insert("sdpMid".to_owned(), Value::String(self.sdp_mid.clone()));
        doc.insert(
            "sdpMLineIndex".to_owned(),
            Value::from(self.sdp_m_line_index),
        );
        doc.insert(
            "sdpCandidate".to_owned(),
            Value::String(self.sdp_candidate.clone()),
        );
        doc.insert("type".to_owned(), Value::String(self.tag.as_str().to_owned()));
        doc
    }

    pub fn candidate(&self) -> IceCandidate {
        IceCandidate {
            server_url: self.server_url.clone(),
            sdp_mid: self.sdp_mid.clone(),
            sdp_m_line_index: self.sdp_m_line_index,
            sdp: self.sdp_candidate.clone(),
        }
    }
}
