use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Mutable, user-level view of the process environment used by the interpreter.
///
/// The environment contains:
/// - `vars`: variables set on top of the process environment. They shadow process
///   variables on lookup and are passed to spawned programs.
/// - `current_dir`: the working directory, kept in sync with the process by `cd`.
/// - `should_exit`: a flag the REPL loop checks to know when to terminate.
///
/// Lookups that miss `vars` read the live process environment, so a variable changed
/// while the shell runs is seen on the next lookup.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Variables layered over the process environment (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// When set to true, indicates that the interactive loop should exit.
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current working directory into a new `Environment` with no overrides.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            vars: HashMap::new(),
            current_dir,
            should_exit: false,
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
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

    /// Directories listed in PATH, in search order. Empty when PATH is unset.
    pub fn search_paths(&self) -> Vec<PathBuf> {
        match self.get_var("PATH") {
            Some(paths) => stdenv::split_paths(&paths).collect(),
            None => Vec::new(),
        }
    }

    /// The user's home directory, from HOME.
    pub fn home(&self) -> Option<String> {
        self.get_var("HOME")
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::env::Environment;
    use std::collections::HashMap;
    use std::env as stdenv;
    use std::path::PathBuf;

    #[test]
    fn test_env_set_and_get_var() {
        let mut env = Environment {
            vars: HashMap::new(),
            current_dir: stdenv::current_dir().unwrap(),
            should_exit: false,
        };

        // initially absent
        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);

        env.set_var("KEY", "VALUE");

        assert_eq!(env.get_var("KEY"), Some("VALUE".to_string()));
    }

    #[test]
    fn test_env_reads_from_process_env() {
        let env = Environment::new();
        assert!(env.get_var("PATH").is_some());
        assert!(env.vars.is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn test_search_paths_keep_order() {
        let mut env = Environment::new();
        env.set_var("PATH", "/usr/local/bin:/usr/bin:/bin");

        assert_eq!(
            env.search_paths(),
            vec![
                PathBuf::from("/usr/local/bin"),
                PathBuf::from("/usr/bin"),
                PathBuf::from("/bin"),
            ]
        );

        // recomputed on every call
        env.set_var("PATH", "/opt/tools");
        assert_eq!(env.search_paths(), vec![PathBuf::from("/opt/tools")]);
    }

    #[test]
    fn test_home_override() {
        let mut env = Environment::new();
        env.set_var("HOME", "/home/someone");
        assert_eq!(env.home().as_deref(), Some("/home/someone"));
    }
}
