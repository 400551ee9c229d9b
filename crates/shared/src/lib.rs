mod error;
pub mod media;
pub mod staging;

pub use error::*;
pub use media::MediaSource;
pub use staging::{Pipeline, StageMode, StageOutcome, TempArea};
