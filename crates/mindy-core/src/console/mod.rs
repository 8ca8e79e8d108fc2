//! # Mindy Console
//!
//! Command-line side of the bootstrap.
//!
//! - [`ConsoleInput`]: raw argv with lookups for global options such as
//!   `--env`/`-e` and `--no-debug`, and resolution of the effective
//!   environment and debug flag.
//! - [`Command`]: a named console command contributed by the kernel.
//! - [`ConsoleApplication`]: the runner that dispatches argv to a command and
//!   reports its exit code.
pub mod command;
pub mod input;
pub mod runner;

pub use command::{Command, CommandContext};
pub use input::{ConsoleEnvironment, ConsoleInput, ConsoleSettings};
pub use runner::ConsoleApplication;

#[cfg(test)]
mod tests;
