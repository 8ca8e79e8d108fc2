/// Framework name
pub const FRAMEWORK_NAME: &str = "Mindy";

/// Framework version
pub const FRAMEWORK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable naming the active environment (legacy name kept for compatibility)
pub const ENV_VAR: &str = "SYMFONY_ENV";

/// Environment variable that disables debug mode when set to "0"
pub const DEBUG_VAR: &str = "SYMFONY_DEBUG";

/// Environment used when neither the command line nor the process environment names one
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Environment in which console debug mode is always off
pub const PROD_ENVIRONMENT: &str = "prod";

/// Console options selecting the environment
pub const ENV_OPTIONS: [&str; 2] = ["--env", "-e"];

/// Console option disabling debug mode
pub const NO_DEBUG_OPTION: &str = "--no-debug";

/// CGI variable whose presence marks a request-serving process
pub const GATEWAY_INTERFACE_VAR: &str = "GATEWAY_INTERFACE";

/// Container id of the token storage service
pub const TOKEN_STORAGE_ID: &str = "security.token_storage";

/// Name under which the built-in HTTP cache wrapper is registered
pub const HTTP_CACHE_WRAPPER: &str = "http_cache";

/// Response header reporting what the HTTP cache did with a request
pub const CACHE_STATUS_HEADER: &str = "x-mindy-cache";
