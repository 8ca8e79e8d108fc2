//! # Mindy Kernel
//!
//! The contract between the application bootstrap and the framework kernel
//! it wraps.
//!
//! - [`Kernel`] / [`KernelFactory`]: what a kernel must provide and how it is
//!   constructed from an environment name and a debug flag.
//! - [`DependencyRegistry`]: the container a kernel exposes, mapping component
//!   ids to shared instances.
//! - [`constants`]: environment variable names, defaults and well-known ids.
//! - [`Error`] and the [`Result`] alias used across the crate.
pub mod component;
pub mod constants;
pub mod error;
pub mod traits;

pub use component::{DependencyRegistry, SharedComponent};
pub use error::{Error, Result};
pub use traits::{Kernel, KernelFactory};
