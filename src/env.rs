use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Mutable, interpreter-level view of the process environment.
///
/// Holds the variable map handed to spawned programs, the working
/// directory commands run in, and the `should_exit` flag: the
/// interpreter's continuation signal, set only by the `exit` builtin and
/// polled by the read-eval loop after each dispatch.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g. PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The working directory commands execute in.
    pub current_dir: PathBuf,
    /// When true, the interactive loop stops prompting.
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current process state into a new `Environment`.
    ///
    /// Variables are copied from `std::env::vars()` and `current_dir` from
    /// `std::env::current_dir()`; `should_exit` starts out false.
    pub fn new() -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            vars,
            current_dir,
            should_exit: false,
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to
    /// `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Environment;
    use std::collections::HashMap;
    use std::env as stdenv;

    #[test]
    fn set_then_get_roundtrips() {
        let mut env = Environment {
            vars: HashMap::new(),
            current_dir: stdenv::current_dir().unwrap(),
            should_exit: false,
        };

        assert_eq!(env.get_var("MINISH_TEST_UNSET_VAR"), None);
        env.set_var("KEY", "VALUE");
        assert_eq!(env.get_var("KEY"), Some("VALUE".to_string()));
    }

    #[test]
    fn snapshot_sees_the_process_environment() {
        let env = Environment::new();
        assert!(env.get_var("PATH").is_some());
        assert!(!env.should_exit);
    }
}
