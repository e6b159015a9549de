use crate::signaling::SignalingConfig;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub signaling: SignalingConfig,

    /// Capacity of the command queue between [`Session`](crate::Session)
    /// handles and the negotiation loop.
    pub command_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            signaling: SignalingConfig::default(),
            command_buffer: 100,
        }
    }
}
