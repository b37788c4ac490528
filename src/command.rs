use std::io::Write;

use crate::env::Environment;
use crate::error::ShellError;
use crate::registry::Registry;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Everything a builtin may touch while running: the registry it was looked
/// up in (for `type`, `help` and `source`), the mutable environment, and the
/// output/error sinks bound for this one invocation.
///
/// The sinks are explicit parameters rather than process-global streams;
/// redirection overrides one of them for a single call and the previous
/// binding is restored when the scope ends.
pub struct Context<'a> {
    pub registry: &'a Registry,
    pub env: &'a mut Environment,
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
}

/// Object-safe capability interface for a builtin command.
///
/// One operation: run with the given arguments against the shell context.
/// Per-operand failures are rendered to `ctx.err` as they happen and the
/// builtin keeps going (returning a non-zero code); failures that invalidate
/// the whole invocation are returned as [`ShellError`] values for the caller
/// to render. Nothing panics across this boundary.
pub trait Builtin {
    fn run(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, ShellError>;
}
