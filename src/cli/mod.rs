//! Command-line interface module.

mod args;
pub mod check;
pub mod page;

pub use args::{Cli, Commands};
