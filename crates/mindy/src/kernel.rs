//! Built-in kernel served by the `mindy` front controller.
use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{CACHE_CONTROL, CONTENT_TYPE};
use http::{Method, StatusCode};

use mindy_core::kernel::constants::{FRAMEWORK_NAME, FRAMEWORK_VERSION, TOKEN_STORAGE_ID};
use mindy_core::kernel::{DependencyRegistry, Kernel, KernelFactory, Result};
use mindy_core::security::{Token, TokenStorage, UserInterface};
use mindy_core::{Command, CommandContext, KernelError, Request, Response, app};

/// Header a fronting server sets for authenticated users.
const REMOTE_USER_HEADER: &str = "x-remote-user";

#[derive(Debug)]
struct RemoteUser {
    name: String,
}

impl UserInterface for RemoteUser {
    fn username(&self) -> &str {
        &self.name
    }
}

pub struct WelcomeKernel {
    environment: String,
    debug: bool,
    container: DependencyRegistry,
}

impl KernelFactory for WelcomeKernel {
    fn boot(environment: &str, debug: bool) -> Result<Self> {
        let mut container = DependencyRegistry::new();
        container.register_instance(TOKEN_STORAGE_ID, Arc::new(TokenStorage::new()));
        log::debug!("WelcomeKernel booted with {:?}", container);
        Ok(Self {
            environment: environment.to_string(),
            debug,
            container,
        })
    }
}

impl WelcomeKernel {
    fn token_storage(&self) -> Result<Arc<TokenStorage>> {
        self.container.get_concrete::<TokenStorage>(TOKEN_STORAGE_ID)
    }
}

fn text(status: StatusCode, body: String) -> Result<Response> {
    Ok(http::Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Bytes::from(body))?)
}

#[async_trait]
impl Kernel for WelcomeKernel {
    fn name(&self) -> &str {
        "welcome"
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
        let token = match request.headers().get(REMOTE_USER_HEADER).and_then(|v| v.to_str().ok()) {
            Some(name) if !name.is_empty() => Token::for_user(Arc::new(RemoteUser { name: name.to_string() })),
            _ => Token::anonymous("anon"),
        };
        self.token_storage()?.set_token(Some(token));

        let readable = request.method() == Method::GET || request.method() == Method::HEAD;
        match request.uri().path() {
            "/" if readable => {
                let mut response = text(
                    StatusCode::OK,
                    format!("Welcome to {} ({})\n", FRAMEWORK_NAME, self.environment),
                )?;
                response
                    .headers_mut()
                    .insert(CACHE_CONTROL, http::HeaderValue::from_static("public, max-age=60"));
                Ok(response)
            }
            "/whoami" if readable => {
                let user = app(true)?
                    .and_then(|a| a.get_user())
                    .map(|u| u.username().to_string())
                    .unwrap_or_else(|| "anonymous".to_string());
                text(StatusCode::OK, format!("Hello, {}\n", user))
            }
            path => text(StatusCode::NOT_FOUND, format!("No route for {}\n", path)),
        }
    }

    async fn terminate(&self, request: &Request, response: &Response) -> Result<()> {
        self.token_storage()?.set_token(None);
        log::info!("{} {} -> {}", request.method(), request.uri(), response.status());
        Ok(())
    }

    fn commands(&self) -> Vec<Arc<dyn Command>> {
        vec![Arc::new(AboutCommand), Arc::new(GreetCommand)]
    }
}

/// Prints framework and kernel details.
struct AboutCommand;

#[async_trait]
impl Command for AboutCommand {
    fn name(&self) -> &str {
        "about"
    }

    fn description(&self) -> &str {
        "Display information about the current kernel"
    }

    async fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<i32> {
        write_about(ctx.kernel, &mut *ctx.output).map_err(|e| KernelError::io(e, "about"))?;
        Ok(0)
    }
}

fn write_about(kernel: &dyn Kernel, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "{} {}", FRAMEWORK_NAME, FRAMEWORK_VERSION)?;
    writeln!(out, "kernel: {}", kernel.name())?;
    writeln!(out, "env: {}", kernel.environment())?;
    writeln!(out, "debug: {}", kernel.is_debug())?;
    writeln!(out, "components: {}", kernel.container().get_registered_ids().join(", "))
}

/// Greets whoever is named on the command line.
struct GreetCommand;

#[async_trait]
impl Command for GreetCommand {
    fn name(&self) -> &str {
        "greet"
    }

    fn description(&self) -> &str {
        "Greet someone"
    }

    async fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<i32> {
        let Some(name) = ctx.args.first() else {
            writeln!(ctx.output, "Not enough arguments (missing: \"name\").")
                .map_err(|e| KernelError::io(e, "greet"))?;
            return Ok(1);
        };
        writeln!(ctx.output, "Hello, {}!", name).map_err(|e| KernelError::io(e, "greet"))?;
        Ok(0)
    }
}
