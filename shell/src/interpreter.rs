use crate::builtin::builtin_factories;
use crate::command::{CommandFactory, ExitCode};
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::ExternalCommand;
use crate::io_adapters::{Input, LineReader};
use crate::lexer;
use std::io::{self, Write};
use tracing::{debug, error};

/// Printed before every read, without a trailing newline.
pub const PROMPT: &str = "$ ";

/// Exit code reported for a name that resolves to nothing runnable.
const NOT_FOUND: ExitCode = 127;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate: builtins and ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// The interpreter maintains an [`Environment`] and a list of [`CommandFactory`] objects
/// that are queried, in order, to create commands by name. See [`Default`] for the
/// factories included out of the box.
///
/// Example
/// ```
/// use minish::Interpreter;
/// let mut sh = Interpreter::default();
/// let mut out = Vec::new();
/// let code = sh.eval_line("echo 'hello   world'", &mut out, &mut Vec::new()).unwrap();
/// assert_eq!(code, 0);
/// assert_eq!(out, b"hello   world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            commands,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Run a single command invocation by name with arguments, on the process's
    /// standard streams.
    ///
    /// Returns the command's exit code or an error if the command cannot be created
    /// or fails to execute.
    ///
    /// ```
    /// use minish::{Interpreter, ShellError};
    /// let mut sh = Interpreter::default();
    /// assert_eq!(sh.run("type", &["cd"]).unwrap(), 0);
    ///
    /// let err = sh.run("no such command", &[]).unwrap_err();
    /// assert!(matches!(
    ///     err.downcast_ref::<ShellError>(),
    ///     Some(ShellError::CommandNotFound(_))
    /// ));
    /// ```
    pub fn run(&mut self, name: &str, args: &[&str]) -> anyhow::Result<ExitCode> {
        let stdout = io::stdout();
        let mut stdout = stdout.lock();
        self.run_with_output(name, args, &mut stdout, &mut io::stderr())
    }

    /// Same as [`Interpreter::run`] with caller-provided output streams.
    ///
    /// A name no factory accepts is a [`ShellError::CommandNotFound`].
    pub fn run_with_output(
        &mut self,
        name: &str,
        args: &[&str],
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> anyhow::Result<ExitCode> {
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&self.env, name, args) {
                return cmd.execute(stdout, stderr, &mut self.env);
            }
        }
        Err(ShellError::CommandNotFound(name.to_string()).into())
    }

    /// Split one input line into words and dispatch it.
    ///
    /// A blank line dispatches nothing and succeeds. An unknown command is reported on
    /// `stdout` as `<name>: command not found`.
    pub fn eval_line(
        &mut self,
        line: &str,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> anyhow::Result<ExitCode> {
        let words = lexer::split_into_words(line.trim());
        let Some((name, args)) = words.split_first() else {
            return Ok(0);
        };
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        debug!(command = %name, ?args, "dispatching");

        match self.run_with_output(name, &args, stdout, stderr) {
            Err(err) => {
                if let Some(ShellError::CommandNotFound(name)) = err.downcast_ref::<ShellError>() {
                    writeln!(stdout, "{name}: command not found")?;
                    return Ok(NOT_FOUND);
                }
                Err(err)
            }
            ok => ok,
        }
    }

    /// The Read-Eval-Print Loop on the process's standard streams.
    pub fn repl(&mut self, reader: &mut dyn LineReader) -> ExitCode {
        let stdout = io::stdout();
        let mut stdout = stdout.lock();
        self.repl_with_output(reader, &mut stdout, &mut io::stderr())
    }

    /// Prompt, read, evaluate, repeat.
    ///
    /// Returns the status the process should exit with: the status given to `exit`,
    /// 0 at end of input, or 1 when reading fails.
    pub fn repl_with_output(
        &mut self,
        reader: &mut dyn LineReader,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> ExitCode {
        loop {
            let line = match reader.read_line(PROMPT, stdout) {
                Ok(Input::Line(line)) => line,
                Ok(Input::Interrupted) => continue,
                Ok(Input::Eof) => {
                    debug!("end of input");
                    return 0;
                }
                Err(err) => {
                    error!(%err, "failed to read input");
                    let _ = writeln!(stderr, "minish: failed to read input: {err}");
                    return 1;
                }
            };

            let status = match self.eval_line(&line, stdout, stderr) {
                Ok(status) => status,
                Err(err) => {
                    error!(%err, line = %line, "command failed");
                    let _ = writeln!(stderr, "minish: {err:#}");
                    1
                }
            };

            if self.env.should_exit {
                debug!(status, "exit requested");
                let _ = stdout.flush();
                return status;
            }
        }
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of commands:
    /// - built-ins: `echo`, `exit`, `type`, `pwd`, `cd`
    /// - external command launcher
    fn default() -> Self {
        let mut commands = builtin_factories();
        commands.push(Box::new(Factory::<ExternalCommand>::default()));
        Self::new(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::tests::lock_current_dir;
    use crate::io_adapters::PlainReader;
    use std::env as stdenv;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    /// Feeds `script` to a fresh interpreter and returns (status, stdout, stderr).
    fn session(sh: &mut Interpreter, script: &str) -> (ExitCode, String, String) {
        let mut reader = PlainReader::new(Cursor::new(script.to_string()));
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = sh.repl_with_output(&mut reader, &mut out, &mut err);
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_blank_lines_only_reprompt() {
        let mut sh = Interpreter::default();
        let (code, out, err) = session(&mut sh, "\n   \n\t \n");
        assert_eq!(code, 0);
        assert_eq!(out, "$ $ $ $ ");
        assert!(err.is_empty());
    }

    #[test]
    fn test_echo_then_exit_with_status() {
        let mut sh = Interpreter::default();
        let (code, out, _) = session(
            &mut sh,
            "echo  hello    world\necho \"it's a \\\"test\\\"\"\nexit 42\necho unreachable\n",
        );
        assert_eq!(code, 42);
        assert_eq!(out, "$ hello world\n$ it's a \"test\"\n$ ");
    }

    #[test]
    fn test_exit_without_argument_and_bad_argument() {
        let mut sh = Interpreter::default();
        assert_eq!(session(&mut sh, "exit\n").0, 0);

        let mut sh = Interpreter::default();
        let (code, out, _) = session(&mut sh, "exit abc\n");
        assert_eq!(code, 1);
        assert_eq!(out, "$ exit: abc: numeric argument required\n");
    }

    #[test]
    fn test_read_failure_ends_the_loop() {
        let mut sh = Interpreter::default();
        let mut reader = PlainReader::new(Cursor::new(vec![0xff, b'\n', b'e', b'\n']));
        let mut out = Vec::new();
        let mut err = Vec::new();

        let code = sh.repl_with_output(&mut reader, &mut out, &mut err);

        assert_eq!(code, 1);
        assert_eq!(out, b"$ ");
        let err = String::from_utf8(err).unwrap();
        assert!(err.contains("failed to read input"), "{err}");
    }

    #[test]
    fn test_unknown_command() {
        let mut sh = Interpreter::default();
        let dir = TempDir::new().unwrap();
        sh.env_mut().set_var("PATH", dir.path().to_string_lossy());

        let (code, out, _) = session(&mut sh, "nonexistent  arg\n");
        assert_eq!(code, 0);
        assert_eq!(out, "$ nonexistent: command not found\n$ ");

        let mut out = Vec::new();
        let status = sh
            .eval_line("'no such'  x", &mut out, &mut Vec::new())
            .unwrap();
        assert_eq!(status, NOT_FOUND);
        assert_eq!(out, b"no such: command not found\n");
    }

    #[test]
    fn test_run_unknown_is_typed_error() {
        let mut sh = Interpreter::default();
        let dir = TempDir::new().unwrap();
        sh.env_mut().set_var("PATH", dir.path().to_string_lossy());

        let err = sh
            .run_with_output("missing", &[], &mut Vec::new(), &mut Vec::new())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ShellError>(),
            Some(ShellError::CommandNotFound(name)) if name == "missing"
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_external_command_receives_decoded_arguments() {
        let _lock = lock_current_dir();
        let mut sh = Interpreter::default();
        sh.env_mut().set_var("PATH", "/bin");

        let (_, out, _) = session(&mut sh, "sh -c 'printf \"[%s][%s]\" \"$1\" \"$2\"' x 'a  b' c\\ d\n");
        assert_eq!(out, "$ [a  b][c d]$ ");
    }

    #[test]
    #[cfg(unix)]
    fn test_type_through_the_loop() {
        let mut sh = Interpreter::default();
        let dir = TempDir::new().unwrap();
        let tool = crate::external::tests::touch(dir.path(), "mytool", 0o755);
        sh.env_mut().set_var("PATH", dir.path().to_string_lossy());

        let (_, out, _) = session(&mut sh, "type echo\ntype mytool\ntype nonexistentcmd123\n");
        assert_eq!(
            out,
            format!(
                "$ echo is a shell builtin\n$ mytool is {}\n$ nonexistentcmd123: not found\n$ ",
                tool.display()
            )
        );
    }

    #[test]
    fn test_failed_cd_keeps_directory() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();

        let mut sh = Interpreter::default();
        let (_, out, _) = session(&mut sh, "cd /nonexistent-path\npwd\n");

        assert_eq!(
            out,
            format!(
                "$ cd: /nonexistent-path: No such file or directory\n$ {}\n$ ",
                orig.display()
            )
        );
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }

    #[test]
    fn test_cd_then_pwd() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let temp = TempDir::new().unwrap();
        let canonical = fs::canonicalize(temp.path()).unwrap();

        let mut sh = Interpreter::default();
        let script = format!("cd '{}'\npwd\n", canonical.display());
        let (_, out, _) = session(&mut sh, &script);
        stdenv::set_current_dir(&orig).unwrap();

        assert_eq!(out, format!("$ $ {}\n$ ", canonical.display()));
        assert_eq!(sh.env().current_dir, canonical);
    }
}
