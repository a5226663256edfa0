//! # sheetdata-xls
//!
//! Legacy BIFF2-BIFF8 (XLS) support for sheetdata: the sheet-data record
//! decoder, the record stream with CONTINUE handling, code-page aware string
//! decoding, and a workbook walker that feeds the decoder.
//!
//! ```no_run
//! use sheetdata_xls::XlsReader;
//!
//! let reader = XlsReader::open_file("book.xls")?;
//! println!("{} workbook", reader.version());
//! for sheet in reader.read_all()? {
//!     println!("{}: {} cells", sheet.info.name, sheet.data.cell_count());
//! }
//! # Ok::<(), sheetdata_xls::XlsError>(())
//! ```

pub mod biff;
pub mod error;
pub mod reader;
pub mod sheet_data;

pub use error::{XlsError, XlsResult};
pub use reader::{read_file, WorkbookStyles, XlsReader};
pub use sheet_data::BiffSheetData;
