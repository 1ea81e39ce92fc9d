use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the interpreter at compile time.
///
/// Builtins are parsed with the [`argh`] crate (`FromArgs`) and executed
/// directly in-process, without spawning a child. The set is closed:
/// `cd`, `pwd`, `exit`, `help`, `history`, resolved by exact match on the
/// command name.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd" or "pwd".
    fn name() -> &'static str;

    /// Execute the command against the provided output stream and
    /// environment.
    ///
    /// Return value follows shell conventions: 0 for success, non-zero for
    /// error. Terminating the interactive loop is expressed through
    /// [`Environment::should_exit`], never through the return value.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, env: &mut Environment) -> Result<ExitCode> {
        match T::execute(*self, &mut std::io::stdout(), env) {
            Ok(code) => Ok(code),
            Err(err) => {
                // A builtin failure is reported here and absorbed: the
                // loop keeps prompting whatever went wrong.
                eprintln!("minish: {err:#}");
                Ok(1)
            }
        }
    }
}

/// Diagnostic produced when a builtin's arguments don't parse, or when
/// argh intercepts `--help`.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, _env: &mut Environment) -> Result<ExitCode> {
        if self.is_error {
            eprint!("{}", self.output);
            Ok(1)
        } else {
            print!("{}", self.output);
            Ok(0)
        }
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name != T::name() {
            return None;
        }
        Some(match T::from_args(&[name], args) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                output,
                is_error: status.is_err(),
            }),
        })
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// Without a target, changes to the directory named by $HOME.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to, absolute or relative to the current
    /// directory; defaults to $HOME when omitted
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let target = match &self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => match env.get_var("HOME") {
                Some(home) => PathBuf::from(home),
                None => return Err(anyhow::anyhow!("cd: HOME is not set")),
            },
        };

        let requested = if target.is_absolute() {
            target
        } else {
            env.current_dir.join(target)
        };

        // Canonicalize first: a bad path fails here, before anything about
        // the working directory has changed.
        let canonical = fs::canonicalize(&requested)
            .with_context(|| format!("cd: {}", requested.display()))?;
        env::set_current_dir(&canonical)
            .with_context(|| format!("cd: {}", canonical.display()))?;
        env.current_dir = canonical;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Print the current working directory.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        writeln!(stdout, "{}", env.current_dir.display()).context("pwd")?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Leave the shell.
pub struct Exit {
    #[argh(positional, greedy)]
    /// accepted and ignored
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        // The only builtin that signals "stop prompting". Arguments are
        // ignored; the loop unwinds on its own instead of the process
        // exiting from here.
        env.should_exit = true;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Show a summary of how the shell works.
pub struct Help {}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        writeln!(
            stdout,
            "minish, an interactive command interpreter\n\
             \n\
             Type a program name with its arguments and press enter.\n\
             Commands separated by '|' run as a pipeline, each stage's\n\
             output feeding the next stage's input.\n\
             \n\
             Builtins:\n\
             \x20 cd [DIR]   change the working directory (defaults to $HOME)\n\
             \x20 pwd        print the working directory\n\
             \x20 help       show this summary\n\
             \x20 history    command history (placeholder, does nothing yet)\n\
             \x20 exit       leave the shell\n\
             \n\
             Anything else is looked up on PATH and run as a child process."
        )
        .context("help")?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Show previously entered commands.
pub struct History {
    #[argh(positional, greedy)]
    /// accepted and ignored
    pub _args: Vec<String>,
}

impl BuiltinCommand for History {
    fn name() -> &'static str {
        "history"
    }

    fn execute(self, _stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        // Deliberately empty: recall within a session comes from the line
        // editor, and persistent history has no specification yet.
        Ok(0)
    }
}
