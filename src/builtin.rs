//! The commands the shell implements itself.
//!
//! One unit struct per command, all behind the [`Builtin`] capability trait.
//! Commands that take a list of path operands (`mkdir`, `rm`, `cat`, `touch`)
//! report each failing operand on the error sink and keep going; commands
//! whose single operand or argument list is unusable return a typed error
//! instead and do nothing.

use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::command::{Builtin, Context, ExitCode};
use crate::error::{ShellError, reason};
use crate::external;
use crate::interpreter;

/// Terminate the shell process with the given status (default 0).
pub struct Exit;

impl Builtin for Exit {
    fn run(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, ShellError> {
        let code = match args.first() {
            None => 0,
            Some(raw) => match raw.parse::<ExitCode>() {
                Ok(code) => code,
                Err(_) => {
                    writeln!(ctx.err, "exit: invalid exit code: '{raw}'")?;
                    return Ok(1);
                }
            },
        };
        std::process::exit(code)
    }
}

/// Print the arguments space-joined, followed by a newline.
pub struct Echo;

impl Builtin for Echo {
    fn run(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, ShellError> {
        writeln!(ctx.out, "{}", args.join(" "))?;
        Ok(0)
    }
}

/// Report how a name would be resolved: builtin, PATH executable, or not at all.
pub struct Type;

impl Builtin for Type {
    fn run(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, ShellError> {
        let Some(name) = args.first() else {
            return Ok(0);
        };
        if ctx.registry.lookup(name).is_some() {
            writeln!(ctx.out, "{name} is a shell builtin")?;
        } else {
            let paths = ctx.env.search_paths();
            match external::find_command_path(paths.as_ref(), Path::new(name)) {
                Some(path) => writeln!(ctx.out, "{name} is {}", path.display())?,
                None => writeln!(ctx.out, "{name}: not found")?,
            }
        }
        Ok(0)
    }
}

/// Print the current working directory.
pub struct Pwd;

impl Builtin for Pwd {
    fn run(&self, ctx: &mut Context<'_>, _args: &[String]) -> Result<ExitCode, ShellError> {
        writeln!(ctx.out, "{}", ctx.env.current_dir.display())?;
        Ok(0)
    }
}

/// Change the working directory. `~` and `~/...` expand to $HOME.
pub struct Cd;

impl Builtin for Cd {
    fn run(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, ShellError> {
        if args.len() != 1 {
            return Err(ShellError::wrong_arg_count("cd"));
        }
        let raw = &args[0];
        let target = ctx.env.expand_tilde(raw);
        match ctx.env.chdir(&target) {
            Ok(()) => Ok(0),
            // the diagnostic names the path as typed, not as expanded
            Err(e) => Err(ShellError::from_io(format!("cd: {raw}: {}", reason(&e)), &e)),
        }
    }
}

/// List the entries of a directory (default `.`), one per line, sorted.
pub struct Ls;

impl Builtin for Ls {
    fn run(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, ShellError> {
        let path = args.first().map(String::as_str).unwrap_or(".");
        let entries = sorted_entries(Path::new(path)).map_err(|e| {
            ShellError::from_io(format!("ls: cannot access '{path}': {}", reason(&e)), &e)
        })?;
        for (name, _) in entries {
            writeln!(ctx.out, "{name}")?;
        }
        Ok(0)
    }
}

/// List every registered builtin name.
pub struct Help;

impl Builtin for Help {
    fn run(&self, ctx: &mut Context<'_>, _args: &[String]) -> Result<ExitCode, ShellError> {
        for name in ctx.registry.names() {
            writeln!(ctx.out, "{name}")?;
        }
        Ok(0)
    }
}

/// Create each named directory, including missing parents.
pub struct Mkdir;

impl Builtin for Mkdir {
    fn run(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, ShellError> {
        let mut code = 0;
        for path in args {
            let target = Path::new(path);
            // the recursive create treats an existing leaf as success, so
            // report that case ourselves
            let result = if target.exists() {
                Err(io::Error::from(io::ErrorKind::AlreadyExists))
            } else {
                fs::create_dir_all(target)
            };
            if let Err(e) = result {
                writeln!(ctx.err, "mkdir: cannot create directory '{path}': {}", reason(&e))?;
                code = 1;
            }
        }
        Ok(code)
    }
}

/// Remove each named path: empty-directory removal for directories, unlink
/// otherwise.
pub struct Rm;

impl Builtin for Rm {
    fn run(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, ShellError> {
        let mut code = 0;
        for path in args {
            let target = Path::new(path);
            let result = if target.is_dir() {
                fs::remove_dir(target)
            } else {
                fs::remove_file(target)
            };
            if let Err(e) = result {
                writeln!(ctx.err, "rm: cannot remove '{path}': {}", reason(&e))?;
                code = 1;
            }
        }
        Ok(code)
    }
}

/// Copy a file, or a directory tree recursively.
pub struct Cp;

impl Builtin for Cp {
    fn run(&self, _ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, ShellError> {
        if args.len() != 2 {
            return Err(ShellError::wrong_arg_count("cp"));
        }
        let (src, dest) = (&args[0], &args[1]);
        let result = if Path::new(src).is_dir() {
            copy_tree(Path::new(src), Path::new(dest))
        } else {
            fs::copy(src, dest).map(|_| ())
        };
        result.map_err(|e| {
            ShellError::from_io(format!("cp: cannot copy '{src}': {}", reason(&e)), &e)
        })?;
        Ok(0)
    }
}

/// Move a path; a directory destination receives the source inside it.
pub struct Mv;

impl Builtin for Mv {
    fn run(&self, _ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, ShellError> {
        if args.len() != 2 {
            return Err(ShellError::wrong_arg_count("mv"));
        }
        let (src, dest) = (&args[0], &args[1]);
        move_path(Path::new(src), Path::new(dest)).map_err(|e| {
            ShellError::from_io(format!("mv: cannot move '{src}': {}", reason(&e)), &e)
        })?;
        Ok(0)
    }
}

/// Print each file's contents verbatim.
pub struct Cat;

impl Builtin for Cat {
    fn run(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, ShellError> {
        let mut code = 0;
        for path in args {
            match fs::File::open(path) {
                Ok(mut file) => {
                    io::copy(&mut file, ctx.out)?;
                }
                Err(e) => {
                    writeln!(ctx.err, "cat: cannot open '{path}': {}", reason(&e))?;
                    code = 1;
                }
            }
        }
        Ok(code)
    }
}

/// Create each file if absent and set its modification time to now.
pub struct Touch;

impl Builtin for Touch {
    fn run(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, ShellError> {
        let mut code = 0;
        for path in args {
            let result = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|file| file.set_modified(SystemTime::now()));
            if let Err(e) = result {
                writeln!(ctx.err, "touch: cannot touch '{path}': {}", reason(&e))?;
                code = 1;
            }
        }
        Ok(code)
    }
}

/// Print the first n lines of a file (default 10).
pub struct Head;

impl Builtin for Head {
    fn run(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, ShellError> {
        let Some(path) = args.first() else {
            return Err(ShellError::missing_operand("head"));
        };
        let count = parse_line_count("head", args.get(1))?;
        let file = open_for("head", path)?;
        let mut reader = BufReader::new(file);
        let mut line = Vec::new();
        for _ in 0..count {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            ctx.out.write_all(&line)?;
        }
        Ok(0)
    }
}

/// Print the last n lines of a file (default 10).
pub struct Tail;

impl Builtin for Tail {
    fn run(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, ShellError> {
        let Some(path) = args.first() else {
            return Err(ShellError::missing_operand("tail"));
        };
        let count = parse_line_count("tail", args.get(1))?;
        let file = open_for("tail", path)?;
        let mut reader = BufReader::new(file);
        let mut lines: Vec<Vec<u8>> = Vec::new();
        loop {
            let mut line = Vec::new();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            lines.push(line);
        }
        let skip = lines.len().saturating_sub(count);
        for line in &lines[skip..] {
            ctx.out.write_all(line)?;
        }
        Ok(0)
    }
}

/// Set a path's permission bits from an octal string.
pub struct Chmod;

impl Builtin for Chmod {
    fn run(&self, _ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, ShellError> {
        if args.len() != 2 {
            return Err(ShellError::wrong_arg_count("chmod"));
        }
        let (mode_raw, path) = (&args[0], &args[1]);
        let mode = u32::from_str_radix(mode_raw, 8).map_err(|_| {
            ShellError::WrongArgumentCount(format!("chmod: invalid mode: '{mode_raw}'"))
        })?;
        if let Err(e) = set_mode(Path::new(path), mode) {
            let message = if e.kind() == io::ErrorKind::NotFound {
                format!("chmod: cannot access '{path}': {}", reason(&e))
            } else {
                format!("chmod: changing permissions of '{path}': {}", reason(&e))
            };
            return Err(ShellError::from_io(message, &e));
        }
        Ok(0)
    }
}

/// Recursively list every entry under a directory (default `.`), depth-first.
pub struct Find;

impl Builtin for Find {
    fn run(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, ShellError> {
        let path = args.first().map(String::as_str).unwrap_or(".");
        let mut code = 0;
        walk(Path::new(path), ctx, &mut code)?;
        Ok(code)
    }
}

/// Execute a script's non-blank, non-comment lines through the dispatcher.
pub struct Source;

impl Builtin for Source {
    fn run(&self, ctx: &mut Context<'_>, args: &[String]) -> Result<ExitCode, ShellError> {
        if args.len() != 1 {
            return Err(ShellError::wrong_arg_count("source"));
        }
        let path = &args[0];
        let text = fs::read_to_string(path).map_err(|e| {
            ShellError::from_io(format!("source: cannot open '{path}': {}", reason(&e)), &e)
        })?;
        interpreter::run_lines(&text, ctx.registry, ctx.env, &mut *ctx.out, &mut *ctx.err)?;
        Ok(0)
    }
}

/// Directory entries as `(name, is_directory)` pairs, sorted by name.
fn sorted_entries(dir: &Path) -> io::Result<Vec<(String, bool)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        entries.push((entry.file_name().to_string_lossy().into_owned(), is_dir));
    }
    entries.sort();
    Ok(entries)
}

fn copy_tree(src: &Path, dest: &Path) -> io::Result<()> {
    // the destination must not exist yet
    fs::create_dir(dest)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn move_path(src: &Path, dest: &Path) -> io::Result<()> {
    let target: PathBuf = if dest.is_dir() {
        match src.file_name() {
            Some(name) => dest.join(name),
            None => dest.to_path_buf(),
        }
    } else {
        dest.to_path_buf()
    };
    match fs::rename(src, &target) {
        Ok(()) => Ok(()),
        // renames cannot cross filesystems; degrade to copy + unlink for files
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices && src.is_file() => {
            fs::copy(src, &target)?;
            fs::remove_file(src)
        }
        Err(e) => Err(e),
    }
}

fn parse_line_count(builtin: &str, raw: Option<&String>) -> Result<usize, ShellError> {
    match raw {
        None => Ok(10),
        Some(s) => s.parse::<usize>().map_err(|_| {
            ShellError::WrongArgumentCount(format!("{builtin}: invalid line count: '{s}'"))
        }),
    }
}

fn open_for(builtin: &str, path: &str) -> Result<fs::File, ShellError> {
    fs::File::open(path).map_err(|e| {
        ShellError::from_io(format!("{builtin}: cannot open '{path}': {}", reason(&e)), &e)
    })
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(path: &Path, _mode: u32) -> io::Result<()> {
    // mode bits carry no meaning here; still surface a missing path
    fs::metadata(path).map(|_| ())
}

fn walk(dir: &Path, ctx: &mut Context<'_>, code: &mut ExitCode) -> Result<(), ShellError> {
    let entries = match sorted_entries(dir) {
        Ok(entries) => entries,
        Err(e) => {
            writeln!(ctx.err, "find: `{}`: {}", dir.display(), reason(&e))?;
            *code = 1;
            return Ok(());
        }
    };
    for (name, is_dir) in entries {
        let full = dir.join(&name);
        writeln!(ctx.out, "{}", full.display())?;
        if is_dir {
            walk(&full, ctx, code)?;
        }
    }
    Ok(())
}
