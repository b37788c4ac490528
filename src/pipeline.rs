//! Execution of `|`-chained external commands.

use std::process::{Child, Stdio};

use crate::env::Environment;
use crate::error::ShellError;
use crate::external::ExternalCommand;
use crate::lexer::{self, ParseError};

/// A chain of external commands where each stage's stdout feeds the next
/// stage's stdin. Builtins do not take part in pipelines.
#[derive(Debug)]
pub struct Pipeline {
    stages: Vec<ExternalCommand>,
}

impl Pipeline {
    /// Splits `line` on every `|` and tokenizes each stage. The split is
    /// textual, so a quoted `|` still separates stages. A stage with no
    /// words is a parse error.
    pub fn parse(line: &str) -> Result<Pipeline, ParseError> {
        let mut stages = Vec::new();
        for part in line.split('|') {
            let mut words = lexer::split_words(part.trim())?;
            if words.is_empty() {
                return Err(ParseError::EmptyCommand);
            }
            let name = words.remove(0);
            stages.push(ExternalCommand::new(name, words));
        }
        Ok(Pipeline { stages })
    }

    /// Spawns every stage left to right, then waits for them in the same
    /// order. The first stage reads the shell's stdin and the last writes
    /// the shell's stdout; adjacent stages are connected with pipes.
    ///
    /// If a stage fails to spawn, the stages after it are not started, the
    /// ones before it are still waited on, and the error is returned. Exit
    /// statuses of the stages are not inspected.
    pub fn run(&self, env: &Environment) -> Result<(), ShellError> {
        let last = self.stages.len() - 1;
        let mut children: Vec<Child> = Vec::with_capacity(self.stages.len());
        let mut result = Ok(());

        for (i, stage) in self.stages.iter().enumerate() {
            let stdin = if i == 0 {
                Stdio::inherit()
            } else {
                // Present unless the previous stage was spawned without a
                // piped stdout, which run order rules out.
                match children.last_mut().and_then(|prev| prev.stdout.take()) {
                    Some(upstream) => Stdio::from(upstream),
                    None => Stdio::null(),
                }
            };
            let stdout = if i == last {
                Stdio::inherit()
            } else {
                Stdio::piped()
            };
            match stage.spawn(env, stdin, stdout, Stdio::inherit()) {
                Ok(child) => children.push(child),
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }

        for mut child in children {
            let _ = child.wait();
        }
        result
    }
}
