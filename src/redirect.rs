//! Output redirection: `>`, `>>`, `2>` and `2>>`.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::process::Stdio;

use crate::command::Context;
use crate::env::Environment;
use crate::error::{ShellError, reason};
use crate::external::ExternalCommand;
use crate::lexer::{self, ParseError};
use crate::registry::Registry;

/// Which of the command's streams is rebound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirStream {
    Stdout,
    Stderr,
}

/// Whether the target file is truncated or extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirMode {
    Truncate,
    Append,
}

/// One parsed redirection clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub target: String,
    pub stream: RedirStream,
    pub mode: RedirMode,
}

/// Splits `line` around the first redirection operator and tokenizes the
/// command half. Stderr operators win over stdout ones, and the append
/// form wins over the truncating form. Text after a second occurrence of
/// the operator is dropped.
///
/// A standalone `1` word just before a stdout operator is the explicit
/// file-descriptor spelling (`cmd 1> f`) and is removed.
///
/// The target file is not touched here, so a command half that fails to
/// tokenize never creates the target.
pub fn parse(line: &str) -> Result<(Vec<String>, Redirection), ParseError> {
    let (command_part, target_part, stream, mode) = if line.contains("2>") {
        let mode = if line.contains("2>>") {
            RedirMode::Append
        } else {
            RedirMode::Truncate
        };
        let op = if mode == RedirMode::Append { "2>>" } else { "2>" };
        let (command_part, target_part) = split_on(line, op);
        (command_part, target_part, RedirStream::Stderr, mode)
    } else {
        let mode = if line.contains(">>") {
            RedirMode::Append
        } else {
            RedirMode::Truncate
        };
        let op = if mode == RedirMode::Append { ">>" } else { ">" };
        let (command_part, target_part) = split_on(line, op);
        (command_part, target_part, RedirStream::Stdout, mode)
    };

    let mut command_part = command_part.trim();
    if stream == RedirStream::Stdout {
        if let Some(rest) = command_part.strip_suffix('1') {
            if rest.is_empty() || rest.ends_with(char::is_whitespace) {
                command_part = rest.trim_end();
            }
        }
    }

    let words = lexer::split_words(command_part)?;
    if words.is_empty() {
        return Err(ParseError::EmptyCommand);
    }
    Ok((
        words,
        Redirection {
            target: target_part.trim().to_string(),
            stream,
            mode,
        },
    ))
}

fn split_on<'a>(line: &'a str, op: &str) -> (&'a str, &'a str) {
    let mut fields = line.split(op);
    let before = fields.next().unwrap_or("");
    let after = fields.next().unwrap_or("");
    (before, after)
}

/// Runs `words` with one stream bound to the redirection target.
///
/// Diagnostics raised by the command go to wherever its error stream
/// points, so `2>` captures them and `>` leaves them on the shell's own
/// error sink. Only a parse failure or an unopenable target is returned
/// to the caller.
pub fn run(
    words: &[String],
    redirect: &Redirection,
    registry: &Registry,
    env: &mut Environment,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), ShellError> {
    let Some((name, args)) = words.split_first() else {
        return Err(ParseError::EmptyCommand.into());
    };
    let mut file = open_target(redirect)?;

    if let Some(builtin) = registry.lookup(name) {
        let outcome = match redirect.stream {
            RedirStream::Stdout => {
                let mut ctx = Context {
                    registry,
                    env,
                    out: &mut file,
                    err: &mut *err,
                };
                builtin.run(&mut ctx, args)
            }
            RedirStream::Stderr => {
                let mut ctx = Context {
                    registry,
                    env,
                    out: &mut *out,
                    err: &mut file,
                };
                builtin.run(&mut ctx, args)
            }
        };
        if let Err(e) = outcome {
            report(redirect.stream, &mut file, err, &e);
        }
    } else {
        let command = ExternalCommand::new(name.clone(), args.to_vec());
        let stdio = file
            .try_clone()
            .map(Stdio::from)
            .map_err(|e| open_failure(&redirect.target, &e))?;
        let outcome = match redirect.stream {
            RedirStream::Stdout => command.run_foreground(env, stdio, Stdio::inherit()),
            RedirStream::Stderr => command.run_foreground(env, Stdio::inherit(), stdio),
        };
        if let Err(e) = outcome {
            report(redirect.stream, &mut file, err, &e);
        }
    }
    Ok(())
}

fn open_target(redirect: &Redirection) -> Result<File, ShellError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true);
    match redirect.mode {
        RedirMode::Truncate => options.truncate(true),
        RedirMode::Append => options.append(true),
    };
    options
        .open(&redirect.target)
        .map_err(|e| open_failure(&redirect.target, &e))
}

fn open_failure(target: &str, err: &std::io::Error) -> ShellError {
    ShellError::from_io(format!("{target}: {}", reason(err)), err)
}

fn report(stream: RedirStream, file: &mut File, err: &mut dyn Write, error: &ShellError) {
    match stream {
        RedirStream::Stdout => {
            let _ = writeln!(err, "{error}");
        }
        RedirStream::Stderr => {
            let _ = writeln!(file, "{error}");
        }
    }
}
