//! modkit CLI library - commands exposed for testing

pub mod commands;
pub mod common;
pub mod errors;

pub use common::GlobalOpts;
