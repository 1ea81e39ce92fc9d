//! Construction and teardown of multi-stage process pipelines.
//!
//! Every channel endpoint in this module is an owned descriptor: it is
//! either consumed by the one child whose standard stream it becomes, or
//! closed when its owner drops. Combined with `O_CLOEXEC` there is no
//! close-it-everywhere bookkeeping left to get wrong: a child can only
//! ever hold the endpoints that were duplicated onto its own stdin/stdout,
//! and the parent holds none once the spawn loop finishes.

use crate::command::ExitCode;
use crate::env::Environment;
use crate::external;
use anyhow::{Context, Result};
use nix::fcntl::OFlag;
use nix::unistd::pipe2;
use std::ffi::OsStr;
use std::os::fd::OwnedFd;
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// A unidirectional byte channel connecting two adjacent pipeline stages.
struct Channel {
    read: OwnedFd,
    write: OwnedFd,
}

/// Allocate `count` channels, or fail before any child process exists.
fn open_channels(count: usize) -> Result<Vec<Channel>> {
    (0..count)
        .map(|_| {
            let (read, write) = pipe2(OFlag::O_CLOEXEC).context("failed to create pipe")?;
            Ok(Channel { read, write })
        })
        .collect()
}

/// Execute a pipeline of two or more stages, reaping every child before
/// returning.
///
/// Each stage runs as an external program: builtin names are not special
/// here. A stage that cannot be launched (unknown program, empty segment,
/// spawn failure) is reported and skipped while its siblings proceed, its
/// channel ends closing so downstream stages read end-of-input. There is
/// no cross-stage cancellation: `false | cat` still runs `cat` to
/// completion. The result is the last launched stage's exit code.
pub fn run(env: &Environment, segments: &[Vec<String>]) -> Result<ExitCode> {
    run_with_final_stdout(env, segments, None)
}

/// Same as [`run`], with an optional override for the last stage's stdout
/// so callers (tests, mostly) can capture pipeline output through a
/// channel of their own. `None` inherits the interpreter's stdout.
pub(crate) fn run_with_final_stdout(
    env: &Environment,
    segments: &[Vec<String>],
    final_stdout: Option<Stdio>,
) -> Result<ExitCode> {
    debug_assert!(
        segments.len() >= 2,
        "single commands never reach the pipeline executor"
    );

    // All channels exist before the first child does; a pipe() failure
    // here abandons the pipeline as a whole.
    let channels = open_channels(segments.len() - 1)?;

    // Stage i reads from channel i-1 and writes into channel i. Moving
    // every endpoint into exactly one Stdio slot up front means whatever a
    // spawn does not consume is closed by drop before the reap loop.
    let mut stdins: Vec<Option<Stdio>> = Vec::with_capacity(segments.len());
    let mut stdouts: Vec<Option<Stdio>> = Vec::with_capacity(segments.len());
    stdins.push(None);
    for channel in channels {
        stdouts.push(Some(Stdio::from(channel.write)));
        stdins.push(Some(Stdio::from(channel.read)));
    }
    stdouts.push(final_stdout);

    let mut children = Vec::with_capacity(segments.len());
    let slots = stdins.into_iter().zip(stdouts);
    for (argv, (stdin, stdout)) in segments.iter().zip(slots) {
        match spawn_stage(env, argv, stdin, stdout) {
            Ok(child) => children.push((stage_name(argv).to_owned(), child)),
            // The broken stage is reported and dropped; neighbors see
            // end-of-input instead of a pipe that never finishes.
            Err(err) => eprintln!("minish: {err:#}"),
        }
    }

    if children.is_empty() {
        return Ok(127);
    }

    // Reap every child, in creation order, with no short-circuit on
    // nonzero status.
    let mut last_code = 0;
    for (name, mut child) in children {
        match child.wait() {
            Ok(status) => last_code = external::exit_code(status),
            Err(err) => {
                log::warn!("failed to wait for {name}: {err}");
                last_code = 1;
            }
        }
    }
    Ok(last_code)
}

fn stage_name(argv: &[String]) -> &str {
    argv.first().map(String::as_str).unwrap_or("")
}

/// Launch one pipeline stage, wiring the provided channel endpoints onto
/// its standard streams; an endpoint of `None` means the stream is
/// inherited from the interpreter.
fn spawn_stage(
    env: &Environment,
    argv: &[String],
    stdin: Option<Stdio>,
    stdout: Option<Stdio>,
) -> Result<Child> {
    let name = match argv.first().filter(|n| !n.is_empty()) {
        Some(name) => name,
        None => anyhow::bail!("empty pipeline stage has no command to run"),
    };
    let search_paths = env.get_var("PATH").unwrap_or_default();
    let program = external::resolve_program(OsStr::new(&search_paths), Path::new(name))
        .ok_or_else(|| anyhow::anyhow!("command not found: {name}"))?;

    let mut command = Command::new(program.as_ref());
    command
        .args(&argv[1..])
        .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(&env.current_dir);
    if let Some(stdin) = stdin {
        command.stdin(stdin);
    }
    if let Some(stdout) = stdout {
        command.stdout(stdout);
    }
    command
        .spawn()
        .with_context(|| format!("cannot execute {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[cfg(unix)]
    fn read_all(fd: OwnedFd) -> String {
        use std::io::Read;
        let mut buf = String::new();
        std::fs::File::from(fd)
            .read_to_string(&mut buf)
            .expect("read from capture pipe");
        buf
    }

    #[test]
    #[cfg(unix)]
    fn stages_are_connected_through_channels() {
        let env = Environment::new();
        let (read, write) = pipe2(OFlag::O_CLOEXEC).expect("capture pipe");
        let code = run_with_final_stdout(
            &env,
            &[argv(&["echo", "hello", "world"]), argv(&["cat"])],
            Some(Stdio::from(write)),
        )
        .unwrap();
        assert_eq!(code, 0);
        assert_eq!(read_all(read), "hello world\n");
    }

    #[test]
    #[cfg(unix)]
    fn three_stage_pipeline_flows_left_to_right() {
        let env = Environment::new();
        let (read, write) = pipe2(OFlag::O_CLOEXEC).expect("capture pipe");
        let code = run_with_final_stdout(
            &env,
            &[
                argv(&["printf", "b\\na\\n"]),
                argv(&["sort"]),
                argv(&["head", "-n", "1"]),
            ],
            Some(Stdio::from(write)),
        )
        .unwrap();
        assert_eq!(code, 0);
        assert_eq!(read_all(read), "a\n");
    }

    #[test]
    #[cfg(unix)]
    fn failing_first_stage_does_not_cancel_the_rest() {
        // `false` exits nonzero without writing; `cat` must still run to
        // completion on the resulting empty input.
        let env = Environment::new();
        let code = run(&env, &[argv(&["false"]), argv(&["cat"])]).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    #[cfg(unix)]
    fn unknown_stage_is_skipped_and_siblings_complete() {
        let env = Environment::new();
        let (read, write) = pipe2(OFlag::O_CLOEXEC).expect("capture pipe");
        let code = run_with_final_stdout(
            &env,
            &[argv(&["minish_zzz_no_such_program"]), argv(&["cat"])],
            Some(Stdio::from(write)),
        )
        .unwrap();
        // cat saw immediate end-of-input and produced nothing.
        assert_eq!(code, 0);
        assert_eq!(read_all(read), "");
    }

    #[test]
    #[cfg(unix)]
    fn empty_stage_fails_gracefully() {
        let env = Environment::new();
        let code = run(&env, &[argv(&[]), argv(&["true"])]).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    #[cfg(unix)]
    fn pipeline_of_only_broken_stages_still_returns() {
        let env = Environment::new();
        let code = run(
            &env,
            &[argv(&["minish_zzz_no_such_a"]), argv(&["minish_zzz_no_such_b"])],
        )
        .unwrap();
        assert_eq!(code, 127);
    }

    #[test]
    #[cfg(unix)]
    fn nonzero_last_stage_code_is_reported() {
        let env = Environment::new();
        let code = run(&env, &[argv(&["true"]), argv(&["false"])]).unwrap();
        assert_eq!(code, 1);
    }
}
