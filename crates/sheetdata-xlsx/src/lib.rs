//! # sheetdata-xlsx
//!
//! SpreadsheetML (XLSX) support for sheetdata: the `sheetData` element
//! decoder and a package walker that feeds it.
//!
//! ```no_run
//! use sheetdata_xlsx::XlsxReader;
//!
//! let mut reader = XlsxReader::open_file("book.xlsx")?;
//! for sheet in reader.read_all()? {
//!     println!("{}: {} cells", sheet.info.name, sheet.data.cell_count());
//! }
//! # Ok::<(), sheetdata_xlsx::XlsxError>(())
//! ```

pub mod error;
pub mod escapes;
pub mod reader;
pub mod sheet_data;
pub mod walk;

pub use error::{XlsxError, XlsxResult};
pub use escapes::decode_excel_escapes;
pub use reader::{read_file, XlsxReader};
pub use sheet_data::SheetDataContext;
pub use walk::decode_xml;
