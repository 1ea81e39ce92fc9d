use crate::env::Environment;
use anyhow::Result;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line
/// tools. A command's exit code says nothing about whether the
/// interactive loop keeps running; only the `exit` builtin (through
/// [`Environment::should_exit`]) ends it.
pub type ExitCode = i32;

/// Object-safe trait for any command the interpreter can execute.
///
/// Implemented by builtins via a blanket impl and by the external program
/// launcher. Execution consumes the command; a fresh instance is created
/// per invocation by a [`CommandFactory`].
pub trait ExecutableCommand {
    /// Execute the command against the interpreter's environment.
    fn execute(self: Box<Self>, env: &mut Environment) -> Result<ExitCode>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`, letting
/// the interpreter fall through to the next factory in its chain.
/// Implementations can consult the environment, e.g. to resolve
/// executables through `PATH`.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and
    /// arguments.
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}
