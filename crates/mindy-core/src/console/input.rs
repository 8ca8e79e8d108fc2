use crate::kernel::constants::{
    DEBUG_VAR, DEFAULT_ENVIRONMENT, ENV_OPTIONS, ENV_VAR, NO_DEBUG_OPTION, PROD_ENVIRONMENT,
};

/// Process arguments as seen by the console runner, program name removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleInput {
    tokens: Vec<String>,
}

/// Environment variables consulted when resolving console settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleEnvironment {
    /// Value of `SYMFONY_ENV`.
    pub environment: Option<String>,
    /// Value of `SYMFONY_DEBUG`.
    pub debug: Option<String>,
}

/// Effective environment name and debug flag for a console run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleSettings {
    pub environment: String,
    pub debug: bool,
}

impl ConsoleEnvironment {
    pub fn from_process() -> Self {
        Self {
            environment: std::env::var(ENV_VAR).ok(),
            debug: std::env::var(DEBUG_VAR).ok(),
        }
    }
}

/// Options whose value may be given as the following token.
fn takes_value(token: &str) -> bool {
    ENV_OPTIONS.contains(&token)
}

impl ConsoleInput {
    /// Parse full argv; the first item is the program name and is skipped.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: args.into_iter().skip(1).map(Into::into).collect(),
        }
    }

    /// Build from tokens that do not include the program name.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Value of the first matching option among `names`.
    ///
    /// Accepts `--name=value`, `--name value`, `-n value` and `-nvalue`.
    /// Scanning stops at a bare `--`.
    pub fn parameter_option(&self, names: &[&str]) -> Option<String> {
        let mut tokens = self.tokens.iter();
        while let Some(token) = tokens.next() {
            if token == "--" {
                return None;
            }
            for name in names {
                if token == name {
                    return tokens.next().cloned();
                }
                if name.starts_with("--") {
                    if let Some(value) = token.strip_prefix(*name).and_then(|r| r.strip_prefix('=')) {
                        return Some(value.to_string());
                    }
                } else if name.len() == 2 && name.starts_with('-') && !token.starts_with("--") {
                    if let Some(value) = token.strip_prefix(*name).filter(|v| !v.is_empty()) {
                        return Some(value.to_string());
                    }
                }
            }
        }
        None
    }

    /// Whether any of `names` appears before a bare `--`.
    pub fn has_parameter_option(&self, names: &[&str]) -> bool {
        for token in &self.tokens {
            if token == "--" {
                return false;
            }
            let present = names.iter().filter(|n| !n.is_empty()).any(|name| {
                token == name
                    || token
                        .strip_prefix(*name)
                        .is_some_and(|rest| rest.starts_with('='))
            });
            if present {
                return true;
            }
        }
        false
    }

    /// Positional tokens, with options and option values removed.
    pub fn arguments(&self) -> Vec<String> {
        let mut arguments = Vec::new();
        let mut tokens = self.tokens.iter();
        let mut options_done = false;
        while let Some(token) = tokens.next() {
            if options_done {
                arguments.push(token.clone());
            } else if token == "--" {
                options_done = true;
            } else if takes_value(token) {
                tokens.next();
            } else if !token.starts_with('-') || token == "-" {
                arguments.push(token.clone());
            }
        }
        arguments
    }

    /// First positional token, taken as the command name.
    pub fn first_argument(&self) -> Option<String> {
        self.arguments().into_iter().next()
    }

    /// Resolve the effective environment and debug flag.
    ///
    /// The environment comes from `--env`/`-e`, then `SYMFONY_ENV`, then
    /// `"dev"`. Debug is on unless `SYMFONY_DEBUG` is `"0"`, `--no-debug` is
    /// present, or the environment is `"prod"`.
    pub fn resolve(&self, env: &ConsoleEnvironment) -> ConsoleSettings {
        let environment = self
            .parameter_option(&ENV_OPTIONS)
            .or_else(|| env.environment.clone().filter(|e| !e.is_empty()))
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
        let debug = env.debug.as_deref() != Some("0")
            && !self.has_parameter_option(&[NO_DEBUG_OPTION])
            && environment != PROD_ENVIRONMENT;
        ConsoleSettings { environment, debug }
    }
}
