//! CLI subcommand handlers. Thin wrappers over the library.

pub mod parse;
pub mod simulate;
