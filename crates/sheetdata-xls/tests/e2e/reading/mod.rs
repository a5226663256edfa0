//! Reading tests: workbooks built in memory, decoded with `XlsReader`.

mod cells;
mod formulas;
mod legacy;
