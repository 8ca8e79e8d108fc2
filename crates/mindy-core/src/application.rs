//! # Mindy Application
//!
//! [`Application`] wraps one kernel and decides how the process is served:
//! a console invocation through [`ConsoleApplication`] or a single HTTP
//! request through the kernel's `handle`/`terminate` pair.
//!
//! An `Application` can be passed around as an ordinary value. The
//! process-wide slot behind [`Application::create_instance`],
//! [`Application::get_instance`] and [`app`] exists for call sites that have
//! no context to thread through.
//!
//! ```text
//! Uninitialized --create_instance--> Active --shutdown--> Uninitialized
//! ```
use std::any::Any;
use std::io::{Read, Write};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::console::{ConsoleApplication, ConsoleEnvironment, ConsoleInput, ConsoleSettings};
use crate::debug;
use crate::kernel::component::{DependencyRegistry, SharedComponent};
use crate::kernel::constants::{FRAMEWORK_NAME, FRAMEWORK_VERSION, GATEWAY_INTERFACE_VAR, TOKEN_STORAGE_ID};
use crate::kernel::error::{Error, Result};
use crate::kernel::traits::{Kernel, KernelFactory};
use crate::security::{TokenStorage, UserInterface};
use crate::web::{CacheWrapperRegistry, CgiEnvironment, send_response};

static INSTANCE: RwLock<Option<Arc<Application>>> = RwLock::new(None);

/// How the process is being driven.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Command-line invocation with the full argv.
    Console(Vec<String>),
    /// One request handed over by a web server gateway.
    Http,
}

impl RunMode {
    /// `Http` when the process was started through a gateway interface,
    /// `Console` with the process arguments otherwise.
    pub fn detect() -> Self {
        if std::env::var_os(GATEWAY_INTERFACE_VAR).is_some() {
            RunMode::Http
        } else {
            RunMode::Console(std::env::args().collect())
        }
    }
}

/// Lifecycle wrapper owning exactly one kernel.
pub struct Application {
    kernel: Arc<dyn Kernel>,
    debug: bool,
    cache_wrapper: Mutex<Option<String>>,
    cache_wrappers: Mutex<CacheWrapperRegistry>,
    /// Wrapped kernel built for the named wrapper, reused across requests.
    wrapped: Mutex<Option<(String, Arc<dyn Kernel>)>>,
}

impl Application {
    /// Boot `K` for `environment` and wrap it.
    pub fn new<K: KernelFactory>(environment: &str, debug: bool) -> Result<Self> {
        log::info!(
            "Booting {} kernel (env: {}, debug: {}) with {} v{}",
            std::any::type_name::<K>(),
            environment,
            debug,
            FRAMEWORK_NAME,
            FRAMEWORK_VERSION
        );
        let kernel = K::boot(environment, debug)?;
        Ok(Self::with_kernel(Arc::new(kernel), debug))
    }

    /// Wrap an already booted kernel.
    pub fn with_kernel(kernel: Arc<dyn Kernel>, debug: bool) -> Self {
        Self {
            kernel,
            debug,
            cache_wrapper: Mutex::new(None),
            cache_wrappers: Mutex::new(CacheWrapperRegistry::default()),
            wrapped: Mutex::new(None),
        }
    }

    /// Create the process-wide instance, or return the existing one.
    ///
    /// When an instance already exists the arguments are ignored and no
    /// kernel is booted.
    pub fn create_instance<K: KernelFactory>(environment: &str, debug: bool) -> Result<Arc<Self>> {
        let mut slot = INSTANCE.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = slot.as_ref() {
            log::debug!(
                "Application instance already exists (env: {}); ignoring create_instance({}, {})",
                existing.kernel.environment(),
                environment,
                debug
            );
            return Ok(existing.clone());
        }
        let app = Arc::new(Self::new::<K>(environment, debug)?);
        *slot = Some(app.clone());
        Ok(app)
    }

    /// The process-wide instance.
    ///
    /// Without an instance this fails with [`Error::InstanceNotCreated`] when
    /// `throw_if_absent` is set and returns `Ok(None)` otherwise.
    pub fn get_instance(throw_if_absent: bool) -> Result<Option<Arc<Self>>> {
        let slot = INSTANCE.read().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some(app) => Ok(Some(app.clone())),
            None if throw_if_absent => Err(Error::InstanceNotCreated),
            None => Ok(None),
        }
    }

    /// The process-wide instance, failing if none was created.
    pub fn instance() -> Result<Arc<Self>> {
        Self::get_instance(true)?.ok_or(Error::InstanceNotCreated)
    }

    /// Clear the process-wide instance. The kernel itself is not torn down.
    pub fn shutdown() {
        let previous = INSTANCE.write().unwrap_or_else(PoisonError::into_inner).take();
        if previous.is_some() {
            log::debug!("Application instance cleared");
        }
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn get_container(&self) -> &DependencyRegistry {
        self.kernel.container()
    }

    pub fn get_kernel(&self) -> &Arc<dyn Kernel> {
        &self.kernel
    }

    /// Wrap the kernel with the named cache wrapper when serving HTTP.
    ///
    /// A name that does not resolve when the request is served is skipped.
    pub fn enable_cache(&self, name: impl Into<String>) {
        *self.cache_wrapper.lock().unwrap_or_else(PoisonError::into_inner) = Some(name.into());
    }

    pub fn cache_wrapper(&self) -> Option<String> {
        self.cache_wrapper.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Make `name` available to [`enable_cache`](Self::enable_cache).
    ///
    /// Replacing the factory of the wrapper in use drops the kernel it built.
    pub fn register_cache_wrapper<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(Arc<dyn Kernel>) -> Arc<dyn Kernel> + Send + Sync + 'static,
    {
        let name = name.into();
        let mut wrapped = self.wrapped.lock().unwrap_or_else(PoisonError::into_inner);
        if wrapped.as_ref().is_some_and(|(built_for, _)| *built_for == name) {
            *wrapped = None;
        }
        self.cache_wrappers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .register(name, factory);
    }

    pub fn has_component(&self, id: &str) -> bool {
        self.get_container().has(id)
    }

    pub fn get_component(&self, id: &str) -> Result<SharedComponent> {
        self.get_container().get(id)
    }

    /// Typed lookup of a component.
    pub fn component<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
        self.get_container().get_concrete::<T>(id)
    }

    /// The authenticated user, if the request has one.
    ///
    /// `None` when no token storage is registered, no token is set, or the
    /// token is anonymous.
    pub fn get_user(&self) -> Option<Arc<dyn UserInterface>> {
        let container = self.get_container();
        if !container.has(TOKEN_STORAGE_ID) {
            return None;
        }
        let storage = match container.get_concrete::<TokenStorage>(TOKEN_STORAGE_ID) {
            Ok(storage) => storage,
            Err(e) => {
                log::warn!("Cannot read the current user: {}", e);
                return None;
            }
        };
        storage.get_token()?.user()
    }

    /// Serve the process in the detected [`RunMode`] using stdio.
    pub async fn run(&self) -> Result<i32> {
        self.run_mode(RunMode::detect()).await
    }

    pub async fn run_mode(&self, mode: RunMode) -> Result<i32> {
        match mode {
            RunMode::Console(args) => {
                let input = ConsoleInput::from_args(args);
                let mut stdout = std::io::stdout();
                self.run_console(&input, &ConsoleEnvironment::from_process(), &mut stdout)
                    .await
            }
            RunMode::Http => {
                let mut stdout = std::io::stdout();
                self.run_http(&CgiEnvironment::from_process(), std::io::stdin(), &mut stdout)
                    .await?;
                Ok(0)
            }
        }
    }

    /// Effective console settings; debug also follows the application's own flag.
    pub fn console_settings(&self, input: &ConsoleInput, env: &ConsoleEnvironment) -> ConsoleSettings {
        let mut settings = input.resolve(env);
        settings.debug = settings.debug || self.debug;
        settings
    }

    /// Run one console invocation and return its exit code.
    pub async fn run_console<W: Write + Send>(
        &self,
        input: &ConsoleInput,
        env: &ConsoleEnvironment,
        output: &mut W,
    ) -> Result<i32> {
        let settings = self.console_settings(input, env);
        if settings.debug {
            debug::enable();
        }
        log::debug!(
            "Console run (env: {}, debug: {}) on kernel env {}",
            settings.environment,
            settings.debug,
            self.kernel.environment()
        );

        let console = ConsoleApplication::new(self.kernel.clone());
        console.run(input, output).await
    }

    /// Serve one request described by `cgi`, reading its body from `body`
    /// and writing the response to `output`.
    pub async fn run_http<R: Read, W: Write>(
        &self,
        cgi: &CgiEnvironment,
        body: R,
        output: &mut W,
    ) -> Result<()> {
        let request = cgi.build_request(body)?;

        if !self.debug {
            self.kernel.load_class_cache()?;
        }

        let kernel = self.http_kernel();
        let response = kernel.handle(&request).await?;
        send_response(&response, output)?;
        log::debug!("{} {} -> {}", request.method(), request.uri(), response.status());

        kernel.terminate(&request, &response).await
    }

    /// The kernel requests go through, wrapped if a resolvable cache wrapper is enabled.
    ///
    /// The wrapper is built once per name so its state outlives a request.
    fn http_kernel(&self) -> Arc<dyn Kernel> {
        let Some(name) = self.cache_wrapper() else {
            return self.kernel.clone();
        };
        let mut wrapped = self.wrapped.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((built_for, kernel)) = wrapped.as_ref() {
            if *built_for == name {
                return kernel.clone();
            }
        }
        let factory = self
            .cache_wrappers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .resolve(&name);
        match factory {
            Some(factory) => {
                let kernel = (*factory)(self.kernel.clone());
                *wrapped = Some((name, kernel.clone()));
                kernel
            }
            None => {
                log::debug!("Cache wrapper '{}' is not registered; serving without it", name);
                self.kernel.clone()
            }
        }
    }
}

/// Shorthand for [`Application::get_instance`].
pub fn app(throw_if_absent: bool) -> Result<Option<Arc<Application>>> {
    Application::get_instance(throw_if_absent)
}
