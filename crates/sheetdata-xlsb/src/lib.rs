//! # sheetdata-xlsb
//!
//! BIFF12 (XLSB) support for sheetdata: the sheet-data record decoder, the
//! record framing, and a package walker that feeds the decoder.
//!
//! ```no_run
//! use sheetdata_xlsb::XlsbReader;
//!
//! let mut reader = XlsbReader::open_file("book.xlsb")?;
//! for sheet in reader.read_all()? {
//!     println!("{}: {} cells", sheet.info.name, sheet.data.cell_count());
//! }
//! # Ok::<(), sheetdata_xlsb::XlsbError>(())
//! ```

pub mod error;
pub mod reader;
pub mod records;
pub mod rich;
pub mod sheet_data;
pub mod stream;

pub use error::{XlsbError, XlsbResult};
pub use reader::{read_file, XlsbReader};
pub use sheet_data::BinarySheetData;
pub use stream::{decode_records, RecordReader};
