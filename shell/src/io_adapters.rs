use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{BufRead, Write};

/// One read attempt from the user.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    /// A line of text, without its line terminator.
    Line(String),
    /// The line being edited was abandoned (Ctrl-C in the editor).
    Interrupted,
    /// No more input.
    Eof,
}

/// Source of input lines for the REPL.
///
/// Implementations are responsible for showing the prompt. Those that do not draw
/// their own prompt write it to `stdout`.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str, stdout: &mut dyn Write) -> Result<Input>;
}

/// Line editor backed reader, for terminals.
///
/// Lines are never added to the editor's history.
pub struct EditorReader {
    editor: DefaultEditor,
}

impl EditorReader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineReader for EditorReader {
    fn read_line(&mut self, prompt: &str, stdout: &mut dyn Write) -> Result<Input> {
        // anything buffered must reach the terminal before the editor draws
        stdout.flush()?;
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Input::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(err) => Err(err.into()),
        }
    }
}

/// Reader for any buffered input, e.g. piped standard input.
pub struct PlainReader<R> {
    reader: R,
}

impl<R: BufRead> PlainReader<R> {
    /// Create a reader that will read lines from `reader`.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineReader for PlainReader<R> {
    fn read_line(&mut self, prompt: &str, stdout: &mut dyn Write) -> Result<Input> {
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(Input::Eof);
        }
        let line = line.strip_suffix('\n').unwrap_or(&line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        Ok(Input::Line(line.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn plain_reader_prints_prompt_and_strips_newline() {
        let mut reader = PlainReader::new(Cursor::new("echo hi\r\npwd\nlast"));
        let mut out = Vec::new();

        assert_eq!(
            reader.read_line("$ ", &mut out).unwrap(),
            Input::Line("echo hi".to_string())
        );
        assert_eq!(
            reader.read_line("$ ", &mut out).unwrap(),
            Input::Line("pwd".to_string())
        );
        assert_eq!(
            reader.read_line("$ ", &mut out).unwrap(),
            Input::Line("last".to_string())
        );
        assert_eq!(reader.read_line("$ ", &mut out).unwrap(), Input::Eof);

        assert_eq!(out, b"$ $ $ $ ");
    }

    #[test]
    fn plain_reader_reports_invalid_utf8() {
        let mut reader = PlainReader::new(Cursor::new(vec![0xff, 0xfe, b'\n']));
        assert!(reader.read_line("$ ", &mut Vec::new()).is_err());
    }
}
