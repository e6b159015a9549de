/// One STUN or TURN server. Credentials are only read for TURN urls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: String,
    pub credential: String,
}

impl IceServerConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: String::new(),
            credential: String::new(),
        }
    }
}

/// Settings for [`WebRtcEngine`](crate::WebRtcEngine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub ice_servers: Vec<IceServerConfig>,

    /// Gather candidates on loopback interfaces. Only useful when both
    /// sides run on the same host.
    pub include_loopback_candidates: bool,

    pub offer_to_receive_video: bool,
    pub offer_to_receive_audio: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::new("stun:stun.l.google.com:19302")],
            include_loopback_candidates: false,
            offer_to_receive_video: true,
            offer_to_receive_audio: false,
        }
    }
}

impl EngineConfig {
    /// No ICE servers and loopback candidates on: for two peers in one process.
    pub fn local() -> Self {
        Self {
            ice_servers: Vec::new(),
            include_loopback_candidates: true,
            ..Self::default()
        }
    }
}
