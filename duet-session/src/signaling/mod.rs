mod publisher;
mod signal_listener;
mod signaling_channel;
mod signaling_config;

pub use publisher::PublishReceipt;
pub use signal_listener::*;
pub use signaling_channel::*;
pub use signaling_config::*;
