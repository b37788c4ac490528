//! The shell's failure taxonomy.
//!
//! Every variant's `Display` is exactly the one-line diagnostic shown to the
//! user; callers render a failed invocation with a single `writeln!`.
//! Variants carry the rendered context rather than live OS errors so results
//! stay comparable in tests and the kind stays matchable in dispatch.

use std::io;

use thiserror::Error;

use crate::lexer::ParseError;

/// A failed command line, classified.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShellError {
    /// The line itself was malformed. Fatal to that line only.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The name resolved to neither a builtin nor an executable.
    #[error("{0}: command not found")]
    CommandNotFound(String),
    /// A foreground external command exited with a non-zero status.
    #[error("{name}: command failed with exit code {code}")]
    ProcessFailed { name: String, code: i32 },
    /// A builtin was invoked with an unusable argument list.
    #[error("{0}")]
    WrongArgumentCount(String),
    /// A path operand does not exist.
    #[error("{0}")]
    PathNotFound(String),
    /// The OS refused access to an operand.
    #[error("{0}")]
    PermissionDenied(String),
    /// Any other OS-level failure during a file operation.
    #[error("{0}")]
    Io(String),
}

impl ShellError {
    /// Wrong-arity diagnostic shared by `cd`, `cp`, `mv`, `chmod`, `source`.
    pub fn wrong_arg_count(builtin: &str) -> Self {
        ShellError::WrongArgumentCount(format!("{builtin}: wrong number of arguments"))
    }

    /// Missing-operand diagnostic used by `head` and `tail`.
    pub fn missing_operand(builtin: &str) -> Self {
        ShellError::WrongArgumentCount(format!("{builtin}: missing file operand"))
    }

    /// Classifies a rendered diagnostic under the kind of the OS error that
    /// caused it.
    pub fn from_io(message: String, err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ShellError::PathNotFound(message),
            io::ErrorKind::PermissionDenied => ShellError::PermissionDenied(message),
            _ => ShellError::Io(message),
        }
    }
}

/// Bare conversion for failures with no operand to blame, e.g. a write to
/// an already-closed sink. Operand failures go through [`ShellError::from_io`]
/// with a rendered message instead.
impl From<io::Error> for ShellError {
    fn from(err: io::Error) -> Self {
        ShellError::from_io(reason(&err), &err)
    }
}

/// Canonical reason text for an OS error, as it appears inside builtin
/// diagnostics ("rm: cannot remove 'x': No such file or directory").
pub fn reason(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => "No such file or directory".to_string(),
        io::ErrorKind::PermissionDenied => "Permission denied".to_string(),
        io::ErrorKind::NotADirectory => "Not a directory".to_string(),
        io::ErrorKind::IsADirectory => "Is a directory".to_string(),
        io::ErrorKind::AlreadyExists => "File exists".to_string(),
        io::ErrorKind::DirectoryNotEmpty => "Directory not empty".to_string(),
        io::ErrorKind::InvalidInput => "Invalid argument".to_string(),
        _ => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_render_as_single_lines() {
        assert_eq!(
            ShellError::CommandNotFound("frob".to_string()).to_string(),
            "frob: command not found"
        );
        assert_eq!(
            ShellError::ProcessFailed { name: "false".to_string(), code: 1 }.to_string(),
            "false: command failed with exit code 1"
        );
        assert_eq!(
            ShellError::wrong_arg_count("cd").to_string(),
            "cd: wrong number of arguments"
        );
        assert_eq!(
            ShellError::missing_operand("head").to_string(),
            "head: missing file operand"
        );
        assert_eq!(
            ShellError::Parse(ParseError::UnterminatedQuote).to_string(),
            "no closing quotation"
        );
    }

    #[test]
    fn io_failures_classify_by_kind() {
        let not_found = io::Error::from(io::ErrorKind::NotFound);
        assert_eq!(
            ShellError::from_io("m".to_string(), &not_found),
            ShellError::PathNotFound("m".to_string())
        );

        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(
            ShellError::from_io("m".to_string(), &denied),
            ShellError::PermissionDenied("m".to_string())
        );

        let broken = io::Error::from(io::ErrorKind::BrokenPipe);
        assert_eq!(ShellError::from_io("m".to_string(), &broken), ShellError::Io("m".to_string()));
    }

    #[test]
    fn reasons_use_canonical_os_text() {
        assert_eq!(
            reason(&io::Error::from(io::ErrorKind::NotFound)),
            "No such file or directory"
        );
        assert_eq!(
            reason(&io::Error::from(io::ErrorKind::PermissionDenied)),
            "Permission denied"
        );
        assert_eq!(reason(&io::Error::from(io::ErrorKind::AlreadyExists)), "File exists");
    }
}
