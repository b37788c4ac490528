//! A small line-oriented command shell core.
//!
//! This crate takes one textual command line at a time, decides whether it
//! names one of the built-in operations or an external executable, and runs
//! it: directly in the foreground, as a `|`-connected pipeline, with its
//! output or error stream redirected to a file, or detached in the
//! background. It also provides prefix completion over builtin names and
//! PATH executables, and script sourcing.
//!
//! The main entry point is [`Interpreter`], which owns the builtin
//! [`Registry`] and the session [`Environment`] and dispatches raw lines.
//! The public modules expose the building blocks for embedding: the
//! [`command`] module defines the capability trait builtins implement, and
//! [`complete`] the completion engine a line editor can drive.

mod builtin;
pub mod command;
pub mod complete;
pub mod env;
mod error;
mod external;
pub mod interpreter;
mod lexer;
mod pipeline;
mod redirect;
mod registry;
#[cfg(test)]
mod testutil;

pub use complete::CompletionEngine;
pub use env::Environment;
pub use error::ShellError;
pub use interpreter::{Interpreter, ParsedInvocation, execute_line};
pub use lexer::ParseError;
pub use pipeline::Pipeline;
pub use redirect::{RedirMode, RedirStream, Redirection};
pub use registry::Registry;
