mod kernel;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{error, info};

use mindy_core::console::ConsoleEnvironment;
use mindy_core::kernel::constants::{GATEWAY_INTERFACE_VAR, HTTP_CACHE_WRAPPER};
use mindy_core::{Application, BootstrapConfig, HttpCache, Kernel, KernelError, RunMode, debug};

use crate::kernel::WelcomeKernel;

/// Mindy: front controller for the built-in welcome kernel
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Bootstrap configuration file (.json, .yaml or .toml)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Run a console command (`list` when none is given)
    Console {
        /// Command name, its arguments and console options such as --env
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Serve the single request described by the CGI environment
    ServeCgi,
}

fn load_config(path: Option<&Path>) -> Result<BootstrapConfig, KernelError> {
    let config = match path {
        Some(path) => BootstrapConfig::load(path)?,
        None => BootstrapConfig::default(),
    };
    Ok(config.with_overrides(&ConsoleEnvironment::from_process()))
}

fn program_name() -> String {
    std::env::args().next().unwrap_or_else(|| "mindy".to_string())
}

#[tokio::main]
async fn main() {
    debug::init_logging("warn");
    let args = CliArgs::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let app = match Application::create_instance::<WelcomeKernel>(config.environment(), config.debug()) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(dir) = config.http_cache_dir.clone() {
        app.register_cache_wrapper(HTTP_CACHE_WRAPPER, move |kernel| {
            Arc::new(HttpCache::with_store_dir(kernel, &dir)) as Arc<dyn Kernel>
        });
    }
    if let Some(wrapper) = &config.http_cache {
        app.enable_cache(wrapper.clone());
    }

    let mode = match args.mode {
        Some(Mode::Console { args }) => {
            RunMode::Console(std::iter::once(program_name()).chain(args).collect())
        }
        Some(Mode::ServeCgi) => RunMode::Http,
        None if std::env::var_os(GATEWAY_INTERFACE_VAR).is_some() => RunMode::Http,
        None => RunMode::Console(vec![program_name()]),
    };
    info!("Running in {:?} mode", mode);

    let code = match app.run_mode(mode).await {
        Ok(code) => code,
        Err(e) => {
            error!("Application error: {}", e);
            eprintln!("Application error: {}", e);
            1
        }
    };

    Application::shutdown();
    std::process::exit(code);
}
