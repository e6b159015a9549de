pub use duet_core::model::{RoomId, Role};

pub mod model {
    pub use duet_core::model::*;
}

pub mod traits {
    pub use duet_core::error::*;
    pub use duet_core::traits::*;
}

#[cfg(feature = "session")]
pub mod session {
    pub use duet_session::*;
}
