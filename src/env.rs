use std::collections::HashMap;
use std::env as stdenv;
use std::io;
use std::path::{Path, PathBuf};

/// Mutable, shell-owned view of the process environment.
///
/// The environment contains:
/// - `vars`: environment variables visible to executed commands.
/// - `current_dir`: the working directory commands run in.
///
/// `cd` keeps `current_dir` and the real process working directory in step,
/// so spawned children and relative file operands agree on where they are.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
}

impl Environment {
    /// Capture the current process state into a new `Environment`.
    ///
    /// Copies `std::env::vars()` and initializes `current_dir` from
    /// `std::env::current_dir()`.
    pub fn new() -> Self {
        let mut vars = HashMap::new();
        for (k, v) in stdenv::vars() {
            vars.insert(k, v);
        }
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { vars, current_dir }
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

    /// The PATH value used for command resolution and completion.
    pub fn search_paths(&self) -> String {
        self.get_var("PATH").unwrap_or_default()
    }

    /// Change the working directory, updating both the process and the
    /// tracked copy. On failure neither changes.
    pub fn chdir(&mut self, path: &Path) -> io::Result<()> {
        stdenv::set_current_dir(path)?;
        self.current_dir = stdenv::current_dir()?;
        Ok(())
    }

    /// Expands a leading `~` or `~/...` to the home directory. Any other
    /// input (including `~user` forms) is returned as typed.
    pub fn expand_tilde(&self, raw: &str) -> PathBuf {
        let home = match self.get_var("HOME") {
            Some(home) if !home.is_empty() => home,
            _ => return PathBuf::from(raw),
        };
        if raw == "~" {
            PathBuf::from(home)
        } else if let Some(rest) = raw.strip_prefix("~/") {
            Path::new(&home).join(rest)
        } else {
            PathBuf::from(raw)
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::lock_current_dir;
    use std::env as stdenv;

    fn bare_env() -> Environment {
        Environment {
            vars: HashMap::new(),
            current_dir: PathBuf::from("."),
        }
    }

    #[test]
    fn test_env_set_and_get_var() {
        let mut env = bare_env();

        // initially absent
        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);

        env.set_var("KEY", "VALUE");

        assert_eq!(env.get_var("KEY"), Some("VALUE".to_string()));
    }

    #[test]
    fn test_env_reads_from_process_env() {
        let env = Environment::new();
        assert!(env.get_var("PATH").is_some());
    }

    #[test]
    fn test_tilde_expands_to_home() {
        let mut env = bare_env();
        env.set_var("HOME", "/home/someone");

        assert_eq!(env.expand_tilde("~"), PathBuf::from("/home/someone"));
        assert_eq!(env.expand_tilde("~/docs"), PathBuf::from("/home/someone/docs"));
    }

    #[test]
    fn test_tilde_left_alone_when_not_a_prefix() {
        let mut env = bare_env();
        env.set_var("HOME", "/home/someone");

        assert_eq!(env.expand_tilde("a~b"), PathBuf::from("a~b"));
        assert_eq!(env.expand_tilde("~other"), PathBuf::from("~other"));
        assert_eq!(env.expand_tilde("plain"), PathBuf::from("plain"));
    }

    #[test]
    fn test_chdir_updates_tracked_dir() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();

        let temp = tempfile::tempdir().unwrap();
        let canonical = temp.path().canonicalize().unwrap();

        let mut env = Environment::new();
        env.chdir(temp.path()).unwrap();
        assert_eq!(env.current_dir, canonical);
        assert_eq!(stdenv::current_dir().unwrap(), canonical);

        env.chdir(&orig).unwrap();
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }

    #[test]
    fn test_chdir_failure_changes_nothing() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();

        let mut env = Environment::new();
        let before = env.current_dir.clone();
        assert!(env.chdir(Path::new("/definitely/not/a/dir/12345")).is_err());
        assert_eq!(env.current_dir, before);
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }
}
