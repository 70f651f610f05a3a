use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::find_command_path;
use crate::interpreter::Factory;
use anyhow::{Result, anyhow};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Names of every builtin, in registry order.
///
/// The set is closed: [`builtin_factories`] creates exactly one factory per name.
pub const BUILTIN_NAMES: [&str; 5] = ["echo", "exit", "type", "pwd", "cd"];

/// Returns true when `name` is exactly the name of a builtin (case-sensitive).
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

/// The builtin registry: one factory per entry of [`BUILTIN_NAMES`].
pub(crate) fn builtin_factories() -> Vec<Box<dyn CommandFactory>> {
    vec![
        Box::new(Factory::<Echo>::default()),
        Box::new(Factory::<Exit>::default()),
        Box::new(Factory::<Type>::default()),
        Box::new(Factory::<Pwd>::default()),
        Box::new(Factory::<Cd>::default()),
    ]
}

/// Built-in commands known to the shell at compile time.
///
/// Builtins turn their argument words into a value through [`argh::FromArgs`] and run
/// directly in-process without spawning a child process. A failed conversion is an
/// [`EarlyExit`] whose output is shown to the user as-is.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Executes the command using provided output streams and environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    /// An `Err` is reported on `stdout` and turns into exit code 1.
    fn execute(
        self,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        match T::execute(*self, stdout, stderr, env) {
            Ok(x) => Ok(x),
            Err(e) => {
                writeln!(stdout, "{e}")?;
                Ok(1)
            }
        }
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        stdout.write_all(self.output.as_bytes())?;
        Ok(if self.is_error { 1 } else { 0 })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name != T::name() {
            return None;
        }
        debug!(builtin = name, ?args, "creating builtin");
        Some(match T::from_args(&[name], args) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                output,
                is_error: status.is_err(),
            }),
        })
    }
}

fn usage(text: &str) -> EarlyExit {
    EarlyExit {
        output: format!("{text}\n"),
        status: Err(()),
    }
}

/// Write the arguments to standard output, separated by single spaces and followed by
/// a newline. Every argument is printed as-is; nothing is treated as an option.
pub struct Echo {
    pub args: Vec<String>,
}

impl FromArgs for Echo {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Self {
            args: args.iter().map(|arg| arg.to_string()).collect(),
        })
    }
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn execute(
        self,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        writeln!(stdout, "{}", self.args.join(" "))?;
        Ok(0)
    }
}

/// Exit the shell.
///
/// The first argument, when present, is the exit status in base 10. Further arguments
/// are ignored. A status that does not parse is reported and the shell exits with 1.
///
/// Any `i32` is accepted and handed to the OS unchanged, which on Unix keeps only the
/// low 8 bits: `exit 256` ends the process with 0 and `exit -1` with 255.
pub struct Exit {
    pub code: Option<String>,
}

impl FromArgs for Exit {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Self {
            code: args.first().map(|arg| arg.to_string()),
        })
    }
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(
        self,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        env.should_exit = true;
        let Some(code) = self.code else {
            return Ok(0);
        };
        match code.parse::<ExitCode>() {
            Ok(code) => Ok(code),
            Err(_) => {
                writeln!(stdout, "exit: {code}: numeric argument required")?;
                Ok(1)
            }
        }
    }
}

/// Tell how a name would be interpreted if used as a command.
///
/// Builtins win over programs of the same name; otherwise the first executable found
/// on PATH is reported.
pub struct Type {
    pub name: String,
}

impl FromArgs for Type {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        match args.first() {
            Some(name) => Ok(Self {
                name: name.to_string(),
            }),
            None => Err(usage("type: usage: type <name>")),
        }
    }
}

impl BuiltinCommand for Type {
    fn name() -> &'static str {
        "type"
    }

    fn execute(
        self,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let name = self.name;
        if is_builtin(&name) {
            writeln!(stdout, "{name} is a shell builtin")?;
            return Ok(0);
        }

        let search_paths = env.search_paths();
        match find_command_path(&search_paths, Path::new(&name)) {
            Some(path) => {
                writeln!(stdout, "{name} is {}", path.display())?;
                Ok(0)
            }
            None => {
                writeln!(stdout, "{name}: not found")?;
                Ok(1)
            }
        }
    }
}

/// Print the current working directory to standard output.
pub struct Pwd {}

impl FromArgs for Pwd {
    fn from_args(_command_name: &[&str], _args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Self {})
    }
}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(
        self,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        match env::current_dir() {
            Ok(dir) => {
                writeln!(stdout, "{}", dir.display())?;
                env.current_dir = dir;
                Ok(0)
            }
            Err(err) => {
                writeln!(stderr, "pwd: {err}")?;
                Ok(1)
            }
        }
    }
}

/// Change the current working directory.
///
/// `~` stands for the directory in HOME. Relative targets are resolved against the
/// current directory.
pub struct Cd {
    pub target: String,
}

impl FromArgs for Cd {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        match args.first() {
            Some(target) => Ok(Self {
                target: target.to_string(),
            }),
            None => Err(usage("cd: usage: cd <directory>")),
        }
    }
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(
        self,
        _stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let target = if self.target == "~" {
            env.home().ok_or(ShellError::HomeNotSet)?
        } else {
            self.target
        };

        let new_dir = env.current_dir.join(&target);
        if let Err(err) = env::set_current_dir(&new_dir) {
            debug!(dir = %new_dir.display(), %err, "chdir failed");
            return Err(anyhow!("cd: {target}: No such file or directory"));
        }
        env.current_dir = env::current_dir().unwrap_or(new_dir);
        Ok(0)
    }
}
