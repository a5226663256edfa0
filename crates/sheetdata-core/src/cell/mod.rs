//! Cell addressing and value types

mod address;
mod value;

pub use address::{CellAddress, CellRange};
pub use value::{parse_iso8601_datetime, CellError, CellType, SharedString};
