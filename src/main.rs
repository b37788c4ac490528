use std::io::{self, Write};
use std::path::PathBuf;

use argh::FromArgs;
use rustyline::Editor;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;

use coresh::{CompletionEngine, Interpreter};

/// A small line-oriented command shell.
#[derive(FromArgs)]
struct ShellArgs {
    /// run a single command line and exit
    #[argh(option, short = 'c')]
    command: Option<String>,

    /// script file to execute instead of reading interactively
    #[argh(positional)]
    script: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args: ShellArgs = argh::from_env();
    let mut interp = Interpreter::new();
    let mut out = io::stdout();
    let mut err = io::stderr();

    if let Some(line) = args.command {
        if let Err(e) = interp.execute_line(&line, &mut out, &mut err) {
            eprintln!("{e}");
            std::process::exit(1);
        }
        return Ok(());
    }

    if let Some(script) = args.script {
        if let Err(e) = interp.run_script(&script, &mut out, &mut err) {
            eprintln!("{e}");
            std::process::exit(1);
        }
        return Ok(());
    }

    repl(&mut interp)
}

fn repl(interp: &mut Interpreter) -> anyhow::Result<()> {
    let helper = ShellHelper {
        engine: CompletionEngine::from_registry(interp.registry()),
    };
    let mut rl: Editor<ShellHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(helper));

    loop {
        match rl.readline("$ ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                rl.add_history_entry(line.as_str())?;
                let mut out = io::stdout();
                let mut err = io::stderr();
                if let Err(e) = interp.execute_line(&line, &mut out, &mut err) {
                    eprintln!("{e}");
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// Bridges the completion engine into the line editor.
struct ShellHelper {
    engine: CompletionEngine,
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // The word being completed runs from the last whitespace to the cursor.
        let start = line[..pos]
            .rfind(|c: char| c.is_whitespace())
            .map(|i| i + 1)
            .unwrap_or(0);
        let prefix = &line[start..pos];

        let search_paths = std::env::var("PATH").unwrap_or_default();
        let proposal = self.engine.propose(prefix, &search_paths);
        if proposal.alert {
            print!("\x07");
            let _ = io::stdout().flush();
        }

        let pairs = proposal
            .candidates
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.trim_end().to_string(),
                replacement: candidate,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl rustyline::Helper for ShellHelper {}
