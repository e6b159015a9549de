use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the call a session plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Initiator,
    Joiner,
}

impl Role {
    pub fn candidate_tag(self) -> CandidateTag {
        match self {
            Role::Initiator => CandidateTag::OfferCandidate,
            Role::Joiner => CandidateTag::AnswerCandidate,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Initiator => f.write_str("initiator"),
            Role::Joiner => f.write_str("joiner"),
        }
    }
}

/// Role tag written into candidate records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CandidateTag {
    OfferCandidate,
    AnswerCandidate,
}

impl CandidateTag {
    pub fn as_str(self) -> &'static str {
        match self {
            CandidateTag::OfferCandidate => "offerCandidate",
            CandidateTag::AnswerCandidate => "answerCandidate",
        }
    }

    pub fn role(self) -> Role {
        match self {
            CandidateTag::OfferCandidate => Role::Initiator,
            CandidateTag::AnswerCandidate => Role::Joiner,
        }
    }
}

impl fmt::Display for CandidateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
