pub mod direction;
pub mod levels;

pub use direction::*;
pub use levels::{LevelTable, LevelTableError, RawLevels};
