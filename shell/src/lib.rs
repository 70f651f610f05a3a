//! A small interactive shell.
//!
//! The shell reads one line at a time, splits it into words honoring single quotes,
//! double quotes and backslash escapes, and runs the first word as a command: one of the
//! builtins (`echo`, `exit`, `type`, `pwd`, `cd`) or a program found on PATH.
//!
//! The main entry point is [`Interpreter`]. Its REPL takes any [`LineReader`], so the
//! same loop serves a terminal ([`EditorReader`]) and piped input ([`PlainReader`]).
//! The public modules [`command`] and [`env`] expose traits and types for implementing
//! your own commands and for interacting with the process environment.

mod builtin;
pub mod command;
pub mod env;
mod error;
mod external;
mod interpreter;
mod io_adapters;
mod lexer;

pub use builtin::{BUILTIN_NAMES, is_builtin};
pub use error::ShellError;
pub use external::find_command_path;
pub use interpreter::{Interpreter, PROMPT};
pub use io_adapters::{EditorReader, Input, LineReader, PlainReader};
pub use lexer::split_into_words;
