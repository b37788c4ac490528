//! Resolving and running commands that are not builtins.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

use crate::command::ExitCode;
use crate::env::Environment;
use crate::error::{ShellError, reason};

/// Command that is not a builtin.
#[derive(Debug)]
pub struct ExternalCommand {
    name: String,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// The resolved invocation, carrying the shell's variables and working
    /// directory. Fails with `CommandNotFound` when the name does not
    /// resolve to an executable.
    fn command(&self, env: &Environment) -> Result<Command, ShellError> {
        let search_paths = env.search_paths();
        let executable = find_command_path(OsStr::new(&search_paths), Path::new(&self.name))
            .ok_or_else(|| ShellError::CommandNotFound(self.name.clone()))?;
        let mut cmd = Command::new(executable.as_ref());
        cmd.args(&self.args)
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir);
        Ok(cmd)
    }

    /// Spawns with explicit stream bindings; used by the pipeline executor.
    pub fn spawn(
        &self,
        env: &Environment,
        stdin: Stdio,
        stdout: Stdio,
        stderr: Stdio,
    ) -> Result<Child, ShellError> {
        let mut cmd = self.command(env)?;
        cmd.stdin(stdin)
            .stdout(stdout)
            .stderr(stderr)
            .spawn()
            .map_err(|e| self.spawn_error(e))
    }

    /// Spawns and blocks until the child exits. Non-zero exits (including
    /// signal deaths, reported as 128+signal) come back as `ProcessFailed`.
    ///
    /// There is no timeout: a child that never exits blocks the shell.
    pub fn run_foreground(
        &self,
        env: &Environment,
        stdout: Stdio,
        stderr: Stdio,
    ) -> Result<ExitCode, ShellError> {
        let mut child = self.spawn(env, Stdio::inherit(), stdout, stderr)?;
        let status = child.wait().map_err(|e| self.spawn_error(e))?;
        let code = status
            .code()
            .unwrap_or_else(|| terminated_by_signal(status));
        if code != 0 {
            return Err(ShellError::ProcessFailed {
                name: self.name.clone(),
                code,
            });
        }
        Ok(0)
    }

    /// Spawns without waiting. Failures (including an unresolvable name) are
    /// deliberately invisible; nothing tracks or reaps the child.
    pub fn spawn_background(&self, env: &Environment) {
        if let Ok(mut cmd) = self.command(env) {
            let _ = cmd.spawn();
        }
    }

    fn spawn_error(&self, err: io::Error) -> ShellError {
        if err.kind() == io::ErrorKind::NotFound {
            ShellError::CommandNotFound(self.name.clone())
        } else {
            ShellError::from_io(format!("{}: {}", self.name, reason(&err)), &err)
        }
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Whether `path` names a file the current user may execute. Completion and
/// PATH resolution both gate on this.
#[cfg(unix)]
pub(crate) fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub(crate) fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it is an executable file.
/// - Relative with multiple components (e.g., `bin/sh`): likewise.
/// - `./foo` on Unix or any `./`-prefixed path on other platforms: likewise.
/// - Single path component (no separators): search each directory in
///   `search_paths` (PATH) and return the first executable match.
/// - Empty path: returns `None`.
///
/// Returns either a borrowed reference to the provided `path` or an owned
/// `PathBuf` when the result is discovered via PATH lookup.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    if search_in_current_dir && is_executable(path) {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => {
            // Empty path -> not found
            None
        }
        (Some(x), None) => {
            // Single component -> search in PATH
            find_in_path(search_paths, x.as_os_str()).map(Cow::Owned)
        }
        _ => {
            // Multiple components -> search in current dir
            find_by_path(path).map(Cow::Borrowed)
        }
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        let path = dir.join(cmd);
        if let Some(path) = find_by_path(&path) {
            return Some(path.to_owned());
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if is_executable(path) { Some(path) } else { None }
}
