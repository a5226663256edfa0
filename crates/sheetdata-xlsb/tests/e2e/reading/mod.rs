//! Reading tests: packages built in memory, decoded with `XlsbReader`.

mod cells;
