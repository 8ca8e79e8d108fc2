//! Mindy application bootstrap.
//!
//! Wraps a framework [`Kernel`] in an [`Application`] that owns it for the
//! lifetime of the process and dispatches either a console invocation or a
//! single HTTP request to it.
pub mod application;
pub mod config;
pub mod console;
pub mod debug;
pub mod kernel;
pub mod security;
pub mod web;

pub use application::{Application, RunMode, app};
pub use config::{BootstrapConfig, ConfigFormat};
pub use console::{Command, CommandContext, ConsoleApplication, ConsoleInput};
pub use kernel::error::Error as KernelError;
pub use kernel::{DependencyRegistry, Kernel, KernelFactory};
pub use security::{Principal, Token, TokenStorage, UserInterface};
pub use web::{HttpCache, Request, Response};

#[cfg(test)]
mod tests;
