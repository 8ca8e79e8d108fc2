use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use crate::console::command::{Command, CommandContext};
use crate::console::input::ConsoleInput;
use crate::kernel::constants::{FRAMEWORK_NAME, FRAMEWORK_VERSION};
use crate::kernel::error::{Error, Result};
use crate::kernel::traits::Kernel;

const LIST_COMMAND: &str = "list";
const HELP_COMMAND: &str = "help";

/// Command-line runner built around a kernel.
///
/// Commands come from [`Kernel::commands`]. `list` and `help` are built in and
/// `list` runs when no command name is given.
pub struct ConsoleApplication {
    kernel: Arc<dyn Kernel>,
    commands: BTreeMap<String, Arc<dyn Command>>,
}

impl ConsoleApplication {
    pub fn new(kernel: Arc<dyn Kernel>) -> Self {
        let mut commands = BTreeMap::new();
        for command in kernel.commands() {
            let name = command.name().to_string();
            if name == LIST_COMMAND || name == HELP_COMMAND {
                log::warn!("Kernel command '{}' shadows a built-in command and is ignored", name);
                continue;
            }
            commands.insert(name, command);
        }
        Self { kernel, commands }
    }

    pub fn kernel(&self) -> &Arc<dyn Kernel> {
        &self.kernel
    }

    pub fn has(&self, name: &str) -> bool {
        name == LIST_COMMAND || name == HELP_COMMAND || self.commands.contains_key(name)
    }

    /// Names of the kernel commands, sorted.
    pub fn command_names(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    /// Dispatch `input` and return the exit code of the command that ran.
    ///
    /// Errors raised by a command are returned unchanged.
    pub async fn run<W: Write + Send>(&self, input: &ConsoleInput, output: &mut W) -> Result<i32> {
        if input.has_parameter_option(&["--version", "-V"]) {
            self.write_version(output)?;
            return Ok(0);
        }

        let mut arguments = input.arguments().into_iter();
        let name = arguments.next();
        let args: Vec<String> = arguments.collect();
        let wants_help = input.has_parameter_option(&["--help", "-h"]);

        match name.as_deref() {
            None | Some(LIST_COMMAND) => {
                self.write_list(output)?;
                Ok(0)
            }
            Some(HELP_COMMAND) => self.write_help(args.first().map(String::as_str), output),
            Some(name) if wants_help => self.write_help(Some(name), output),
            Some(name) => match self.commands.get(name) {
                Some(command) => {
                    log::debug!("Running console command '{}' with {:?}", name, args);
                    let mut ctx = CommandContext {
                        kernel: self.kernel.as_ref(),
                        args,
                        output,
                    };
                    command.execute(&mut ctx).await
                }
                None => {
                    writeln!(output, "Command \"{}\" is not defined.", name)
                        .map_err(|e| Error::io(e, "write console output"))?;
                    Ok(1)
                }
            },
        }
    }

    fn write_version<W: Write>(&self, output: &mut W) -> Result<()> {
        writeln!(
            output,
            "{} {} (kernel: {}, env: {}, debug: {})",
            FRAMEWORK_NAME,
            FRAMEWORK_VERSION,
            self.kernel.name(),
            self.kernel.environment(),
            self.kernel.is_debug()
        )
        .map_err(|e| Error::io(e, "write console output"))
    }

    fn write_list<W: Write>(&self, output: &mut W) -> Result<()> {
        let write = |output: &mut W| -> std::io::Result<()> {
            writeln!(
                output,
                "{} (env: {}, debug: {})",
                self.kernel.name(),
                self.kernel.environment(),
                self.kernel.is_debug()
            )?;
            writeln!(output)?;
            writeln!(output, "Available commands:")?;
            let width = self
                .commands
                .keys()
                .map(String::len)
                .chain([LIST_COMMAND.len(), HELP_COMMAND.len()])
                .max()
                .unwrap_or(0);
            writeln!(output, "  {:width$}  {}", HELP_COMMAND, "Display help for a command")?;
            writeln!(output, "  {:width$}  {}", LIST_COMMAND, "List commands")?;
            for (name, command) in &self.commands {
                writeln!(output, "  {:width$}  {}", name, command.description())?;
            }
            Ok(())
        };
        write(output).map_err(|e| Error::io(e, "write console output"))
    }

    fn write_help<W: Write>(&self, name: Option<&str>, output: &mut W) -> Result<i32> {
        let name = name.unwrap_or(HELP_COMMAND);
        let description = match name {
            LIST_COMMAND => Some("List commands"),
            HELP_COMMAND => Some("Display help for a command"),
            other => self.commands.get(other).map(|c| c.description()),
        };
        let code = match description {
            Some(description) => {
                writeln!(output, "Usage:\n  {} [options] [--] [<args>...]\n", name)
                    .and_then(|_| writeln!(output, "{}", description))
                    .map_err(|e| Error::io(e, "write console output"))?;
                0
            }
            None => {
                writeln!(output, "Command \"{}\" is not defined.", name)
                    .map_err(|e| Error::io(e, "write console output"))?;
                1
            }
        };
        Ok(code)
    }
}
