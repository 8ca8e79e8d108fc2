use std::sync::Arc;

use async_trait::async_trait;

use crate::console::Command;
use crate::kernel::component::DependencyRegistry;
use crate::kernel::error::Result;
use crate::web::{Request, Response};

/// Framework object that owns the container and serves requests and commands.
///
/// The bootstrap never looks past this trait: it asks for the container,
/// forwards requests to [`handle`](Kernel::handle), calls
/// [`terminate`](Kernel::terminate) once the response has been sent and
/// collects console commands from [`commands`](Kernel::commands).
#[async_trait]
pub trait Kernel: Send + Sync {
    /// Short name shown by the console runner.
    fn name(&self) -> &str {
        "app"
    }

    fn environment(&self) -> &str;

    fn is_debug(&self) -> bool;

    /// The dependency registry built while booting.
    fn container(&self) -> &DependencyRegistry;

    /// Turns a request into a response.
    async fn handle(&self, request: &Request) -> Result<Response>;

    /// Post-response hook, called after the response has been emitted.
    async fn terminate(&self, _request: &Request, _response: &Response) -> Result<()> {
        Ok(())
    }

    /// Warms whatever the kernel caches between requests. Skipped in debug mode.
    fn load_class_cache(&self) -> Result<()> {
        Ok(())
    }

    /// Console commands this kernel exposes.
    fn commands(&self) -> Vec<Arc<dyn Command>> {
        Vec::new()
    }
}

/// Construction contract used by `Application::create_instance`.
pub trait KernelFactory: Kernel + Sized + 'static {
    fn boot(environment: &str, debug: bool) -> Result<Self>;
}
