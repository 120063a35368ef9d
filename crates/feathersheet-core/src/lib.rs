pub mod cell;
pub mod clipboard;
pub mod convert;
pub mod dtype;
pub mod error;
pub mod range;
pub mod search;
pub mod table;

pub use cell::{coerce_input, parse_timestamp, CellValue};
pub use clipboard::{paste_plan, serialize, PasteCell, PastePlan};
pub use convert::{convert_value, convert_values};
pub use dtype::DataType;
pub use error::TableError;
pub use range::{col_from_label, col_to_label, CellCoord, SelectionRange};
pub use search::FindCursor;
pub use table::{Column, Table};
