mod engine_config;
mod webrtc_engine;

pub use engine_config::*;
pub use webrtc_engine::*;
