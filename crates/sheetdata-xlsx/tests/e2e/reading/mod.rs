//! Reading tests: packages built in memory, decoded with `XlsxReader`.

mod data_types;
mod formulas;
mod rows;
