pub mod stack;

pub use stack::{HistoryManager, DEFAULT_HISTORY_DEPTH};
