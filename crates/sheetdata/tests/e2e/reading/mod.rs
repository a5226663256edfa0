//! Reading tests

mod decoders;
mod formats;
