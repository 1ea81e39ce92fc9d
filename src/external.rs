use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// A command resolved to an executable outside the interpreter.
///
/// Executing it spawns exactly one child process with the parent's
/// standard streams and blocks until that child terminates. A stopped
/// (but not exited) child does not satisfy the wait: `Child::wait` is
/// `waitpid` without `WUNTRACED`, so the interpreter keeps blocking until
/// the child actually exits or dies to a signal.
pub struct ExternalCommand {
    program: OsString,
    args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new(program: OsString, args: Vec<OsString>) -> Self {
        Self { program, args }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        let search_paths = env.get_var("PATH")?;
        let program = resolve_program(OsStr::new(&search_paths), Path::new(name))?;
        Some(Box::new(ExternalCommand::new(
            program.into_owned().into_os_string(),
            args.iter().map(|a| a.into()).collect(),
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(self: Box<Self>, env: &mut Environment) -> Result<ExitCode> {
        // Standard streams are inherited; a spawn failure (resource
        // exhaustion, permission) reports and abandons the launch, leaving
        // nothing behind to reap.
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir)
            .spawn()
            .with_context(|| format!("cannot execute {}", self.program.to_string_lossy()))?;
        let status = child
            .wait()
            .with_context(|| format!("failed to wait for {}", self.program.to_string_lossy()))?;
        Ok(exit_code(status))
    }
}

/// Map a child's termination status onto a shell exit code.
///
/// A normal exit passes its code through; death by signal maps to
/// `128 + N`, the usual shell convention.
pub(crate) fn exit_code(status: ExitStatus) -> ExitCode {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Locate the executable for `name` the way a shell would.
///
/// Absolute paths and explicit relative paths (`./foo`, `bin/foo`) are
/// checked directly; a bare program name is searched through the
/// directories of `search_paths` (a `PATH` value) in order, first hit
/// wins. An empty name never resolves, which is how an empty pipeline
/// segment ends up as "command not found" instead of an exec of nothing.
pub(crate) fn resolve_program<'a>(search_paths: &OsStr, name: &'a Path) -> Option<Cow<'a, Path>> {
    if name.as_os_str().is_empty() {
        return None;
    }
    let mut components = name.components();
    let bare = matches!((components.next(), components.next()), (Some(_), None))
        && !name.starts_with("./");
    if bare {
        return find_in_search_paths(search_paths, name.as_os_str()).map(Cow::Owned);
    }
    // Absolute, `./`-prefixed, or multi-component: take the path at face
    // value against the current directory.
    name.exists().then_some(Cow::Borrowed(name))
}

fn find_in_search_paths(search_paths: &OsStr, program: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.exists())
}
