mod negotiation_command;
mod negotiation_controller;
mod negotiation_state;
mod signal_relay;

pub use negotiation_command::*;
pub use negotiation_controller::*;
pub use negotiation_state::*;
