//! Library surface of the `rip` command-line tool.
//!
//! Commands render their output to a `String` so they can be driven from
//! tests without a process boundary.

pub mod cli;
pub mod commands;
pub mod logging;
