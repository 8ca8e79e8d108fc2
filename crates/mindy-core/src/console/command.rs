use std::io::Write;

use async_trait::async_trait;

use crate::kernel::error::Result;
use crate::kernel::traits::Kernel;

/// What a command gets to work with while executing.
pub struct CommandContext<'a> {
    /// Kernel the console application was built around.
    pub kernel: &'a dyn Kernel,
    /// Arguments that followed the command name, global options removed.
    pub args: Vec<String>,
    pub output: &'a mut (dyn Write + Send),
}

/// A console command exposed through [`Kernel::commands`](crate::kernel::Kernel::commands).
#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Runs the command and returns its process exit code.
    async fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<i32>;
}
