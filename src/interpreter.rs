//! Line dispatch: decide what a raw input line is and execute it.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;

use crate::command::Context;
use crate::env::Environment;
use crate::error::{ShellError, reason};
use crate::external::ExternalCommand;
use crate::lexer::{self, ParseError};
use crate::pipeline::Pipeline;
use crate::redirect::{self, Redirection};
use crate::registry::Registry;

/// What one raw line turned out to be.
///
/// The checks run in a fixed order: redirection first, then pipeline, then
/// the background suffix, so a line containing both `>` and `|` goes down
/// the redirection path.
pub enum ParsedInvocation {
    /// Nothing but whitespace.
    Blank,
    /// One command with a stream rebound to a file.
    Redirected {
        words: Vec<String>,
        redirect: Redirection,
    },
    /// `|`-chained external commands.
    Pipeline(Pipeline),
    /// Trailing `&`: spawn and forget.
    Background { words: Vec<String> },
    /// Plain foreground builtin or external command.
    Direct { words: Vec<String> },
}

pub fn parse(line: &str) -> Result<ParsedInvocation, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ParsedInvocation::Blank);
    }
    if line.contains('>') {
        let (words, redirect) = redirect::parse(line)?;
        return Ok(ParsedInvocation::Redirected { words, redirect });
    }
    if line.contains('|') {
        return Ok(ParsedInvocation::Pipeline(Pipeline::parse(line)?));
    }
    if let Some(rest) = line.strip_suffix('&') {
        let words = lexer::split_words(rest.trim_end())?;
        if words.is_empty() {
            return Err(ParseError::EmptyCommand);
        }
        return Ok(ParsedInvocation::Background { words });
    }
    let words = lexer::split_words(line)?;
    if words.is_empty() {
        return Ok(ParsedInvocation::Blank);
    }
    Ok(ParsedInvocation::Direct { words })
}

pub fn execute(
    invocation: ParsedInvocation,
    registry: &Registry,
    env: &mut Environment,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), ShellError> {
    match invocation {
        ParsedInvocation::Blank => Ok(()),
        ParsedInvocation::Redirected { words, redirect } => {
            redirect::run(&words, &redirect, registry, env, out, err)
        }
        ParsedInvocation::Pipeline(pipeline) => pipeline.run(env),
        ParsedInvocation::Background { words } => {
            let Some((name, args)) = words.split_first() else {
                return Ok(());
            };
            ExternalCommand::new(name.clone(), args.to_vec()).spawn_background(env);
            Ok(())
        }
        ParsedInvocation::Direct { words } => {
            let Some((name, args)) = words.split_first() else {
                return Ok(());
            };
            match registry.lookup(name) {
                Some(builtin) => {
                    let mut ctx = Context {
                        registry,
                        env,
                        out,
                        err,
                    };
                    builtin.run(&mut ctx, args).map(|_| ())
                }
                None => ExternalCommand::new(name.clone(), args.to_vec())
                    .run_foreground(env, Stdio::inherit(), Stdio::inherit())
                    .map(|_| ()),
            }
        }
    }
}

/// Parses and runs one raw line. Errors come back to the caller, which
/// decides where to render them.
pub fn execute_line(
    line: &str,
    registry: &Registry,
    env: &mut Environment,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), ShellError> {
    execute(parse(line)?, registry, env, out, err)
}

/// Executes `text` one line at a time. Blank lines and `#` comments are
/// skipped; a failing line is reported to `err` and does not stop the
/// lines after it.
pub fn run_lines(
    text: &str,
    registry: &Registry,
    env: &mut Environment,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), ShellError> {
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Err(e) = execute_line(line, registry, env, &mut *out, &mut *err) {
            writeln!(err, "{e}")?;
        }
    }
    Ok(())
}

/// Owns the builtin table and shell state for one session.
pub struct Interpreter {
    registry: Registry,
    env: Environment,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            registry: Registry::with_builtins(),
            env: Environment::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Dispatches one raw input line.
    pub fn execute_line(
        &mut self,
        line: &str,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<(), ShellError> {
        execute_line(line, &self.registry, &mut self.env, out, err)
    }

    /// Runs a script file: the non-interactive counterpart of `source`.
    /// Only a failure to read the file itself aborts the run.
    pub fn run_script(
        &mut self,
        path: &Path,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<(), ShellError> {
        let text = fs::read_to_string(path)
            .map_err(|e| ShellError::from_io(format!("{}: {}", path.display(), reason(&e)), &e))?;
        run_lines(&text, &self.registry, &mut self.env, out, err)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
