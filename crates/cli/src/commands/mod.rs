//! Subcommand implementations.
//!
//! Each command renders to a `String` first so the output can be tested
//! without capturing stdout.

pub mod cart;
pub mod catalog;
