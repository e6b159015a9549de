pub mod error;
pub mod model;
pub mod traits;

pub use error::{EngineError, ModelError, StoreError};
pub use model::*;
pub use traits::*;
