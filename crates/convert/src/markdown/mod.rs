//! Markdown body decomposition and rendering shared by every converter.

pub(crate) mod blocks;
pub mod parse;
pub(crate) mod render;

pub use parse::{decompose, Decomposed};
