pub mod clipboard;
pub mod config;
pub mod error;
pub mod model;
pub mod session;
pub mod shell;

pub use clipboard::{ClipboardProvider, MemoryClipboard};
pub use config::Config;
pub use error::AppError;
pub use model::{ModelEvent, PasteReport, TableModel};
pub use session::Session;
pub use shell::{Shell, ShellOutcome};
