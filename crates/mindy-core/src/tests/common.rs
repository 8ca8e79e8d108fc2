//! Kernels and commands shared by the crate's tests.
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use http::header::CACHE_CONTROL;

use crate::console::{Command, CommandContext};
use crate::kernel::component::DependencyRegistry;
use crate::kernel::error::{Error, Result};
use crate::kernel::traits::{Kernel, KernelFactory};
use crate::web::{Request, Response};

pub const COUNTERS_ID: &str = "test.counters";

/// Counts what the bootstrap asked a kernel to do.
#[derive(Debug, Default)]
pub struct KernelCounters {
    pub handled: AtomicUsize,
    pub terminated: AtomicUsize,
    pub class_cache_loads: AtomicUsize,
}

impl KernelCounters {
    pub fn handled(&self) -> usize {
        self.handled.load(Ordering::SeqCst)
    }

    pub fn terminated(&self) -> usize {
        self.terminated.load(Ordering::SeqCst)
    }

    pub fn class_cache_loads(&self) -> usize {
        self.class_cache_loads.load(Ordering::SeqCst)
    }
}

/// Kernel answering every request with its environment and the request path.
///
/// Paths under `/cached` get a shared-cacheable response (one second under
/// `/cached/short`) and `/fail` errors.
/// `HEAD` requests get the same headers and an empty body.
pub struct TestKernel {
    name: &'static str,
    environment: String,
    debug: bool,
    container: DependencyRegistry,
    counters: Arc<KernelCounters>,
}

impl TestKernel {
    pub fn build(name: &'static str, environment: &str, debug: bool) -> Self {
        let counters = Arc::new(KernelCounters::default());
        let mut container = DependencyRegistry::new();
        container.register_instance(COUNTERS_ID, counters.clone());
        Self {
            name,
            environment: environment.to_string(),
            debug,
            container,
            counters,
        }
    }

    pub fn counters(&self) -> Arc<KernelCounters> {
        self.counters.clone()
    }

    pub fn container_mut(&mut self) -> &mut DependencyRegistry {
        &mut self.container
    }
}

impl KernelFactory for TestKernel {
    fn boot(environment: &str, debug: bool) -> Result<Self> {
        Ok(Self::build("test", environment, debug))
    }
}

#[async_trait]
impl Kernel for TestKernel {
    fn name(&self) -> &str {
        self.name
    }

    fn environment(&self) -> &str {
        &self.environment
    }

    fn is_debug(&self) -> bool {
        self.debug
    }

    fn container(&self) -> &DependencyRegistry {
        &self.container
    }

    async fn handle(&self, request: &Request) -> Result<Response> {
        let count = self.counters.handled.fetch_add(1, Ordering::SeqCst) + 1;
        let path = request.uri().path();
        if path.starts_with("/fail") {
            return Err(Error::kernel("controller exploded"));
        }
        let body = if request.method() == http::Method::HEAD {
            String::new()
        } else {
            format!("env={} path={} count={}", self.environment, path, count)
        };
        let mut builder = http::Response::builder().status(StatusCode::OK);
        if path.starts_with("/cached/short") {
            builder = builder.header(CACHE_CONTROL, "public, max-age=1");
        } else if path.starts_with("/cached") {
            builder = builder.header(CACHE_CONTROL, "public, max-age=60");
        }
        Ok(builder.body(Bytes::from(body))?)
    }

    async fn terminate(&self, _request: &Request, _response: &Response) -> Result<()> {
        self.counters.terminated.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load_class_cache(&self) -> Result<()> {
        self.counters.class_cache_loads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn commands(&self) -> Vec<Arc<dyn Command>> {
        vec![Arc::new(EchoCommand), Arc::new(FailCommand)]
    }
}

/// A second kernel type, to tell instances apart.
pub struct OtherKernel(TestKernel);

impl KernelFactory for OtherKernel {
    fn boot(environment: &str, debug: bool) -> Result<Self> {
        Ok(Self(TestKernel::build("other", environment, debug)))
    }
}

#[async_trait]
impl Kernel for OtherKernel {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn environment(&self) -> &str {
        self.0.environment()
    }

    fn is_debug(&self) -> bool {
        self.0.is_debug()
    }

    fn container(&self) -> &DependencyRegistry {
        self.0.container()
    }

    async fn handle(&self, request: &Request) -> Result<Response> {
        self.0.handle(request).await
    }
}

/// Kernel whose boot always fails.
pub struct BrokenKernel;

impl KernelFactory for BrokenKernel {
    fn boot(_environment: &str, _debug: bool) -> Result<Self> {
        Err(Error::kernel("cannot boot"))
    }
}

#[async_trait]
impl Kernel for BrokenKernel {
    fn environment(&self) -> &str {
        "broken"
    }

    fn is_debug(&self) -> bool {
        false
    }

    fn container(&self) -> &DependencyRegistry {
        unreachable!("BrokenKernel never boots")
    }

    async fn handle(&self, _request: &Request) -> Result<Response> {
        unreachable!("BrokenKernel never boots")
    }
}

/// Decorator counting the requests that went through it.
pub struct CountingWrapper {
    pub inner: Arc<dyn Kernel>,
    pub hits: Arc<AtomicUsize>,
}

#[async_trait]
impl Kernel for CountingWrapper {
    fn environment(&self) -> &str {
        self.inner.environment()
    }

    fn is_debug(&self) -> bool {
        self.inner.is_debug()
    }

    fn container(&self) -> &DependencyRegistry {
        self.inner.container()
    }

    async fn handle(&self, request: &Request) -> Result<Response> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        let mut response = self.inner.handle(request).await?;
        response
            .headers_mut()
            .insert("x-wrapped", http::HeaderValue::from_static("yes"));
        Ok(response)
    }

    async fn terminate(&self, request: &Request, response: &Response) -> Result<()> {
        self.inner.terminate(request, response).await
    }
}

/// Writes its arguments back, space separated.
pub struct EchoCommand;

#[async_trait]
impl Command for EchoCommand {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Print the arguments"
    }

    async fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<i32> {
        writeln!(ctx.output, "{}", ctx.args.join(" ")).map_err(|e| Error::io(e, "echo"))?;
        Ok(0)
    }
}

/// Always fails with a kernel error.
pub struct FailCommand;

#[async_trait]
impl Command for FailCommand {
    fn name(&self) -> &str {
        "fail"
    }

    async fn execute(&self, _ctx: &mut CommandContext<'_>) -> Result<i32> {
        Err(Error::kernel("command failed"))
    }
}

/// CGI variables for a plain request.
pub fn cgi_vars(method: &str, uri: &str) -> Vec<(String, String)> {
    vec![
        ("GATEWAY_INTERFACE".to_string(), "CGI/1.1".to_string()),
        ("REQUEST_METHOD".to_string(), method.to_string()),
        ("REQUEST_URI".to_string(), uri.to_string()),
        ("HTTP_HOST".to_string(), "example.test".to_string()),
    ]
}
