pub mod error;
pub mod feather;

pub use error::{IoError, Result};
pub use feather::{read_feather, read_from, write_feather, write_to};
