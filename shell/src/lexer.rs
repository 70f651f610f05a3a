//! A module implementing lexical analysis (word splitting) for the shell's input lines.
//!
//! Quoting rules:
//! - Inside single quotes every character is literal, including the backslash.
//! - Inside double quotes a backslash escapes the next character; single quotes are literal.
//! - Outside quotes a backslash escapes the next character and spaces separate words.
//!
//! Unterminated quotes and a trailing backslash are not errors: the scan just ends with
//! whatever was accumulated.

const ESCAPE: char = '\\';
const SINGLE_QUOTE: char = '\'';
const DOUBLE_QUOTE: char = '"';
const SEPARATOR: char = ' ';

/// Splits an input line into decoded words.
///
/// Quote characters and escaping backslashes are removed from the words. Adjacent quoted
/// and unquoted pieces with no space between them are joined into a single word.
///
/// An empty or all-space line yields an empty vector.
///
/// # Arguments
/// * `line` - The line to be split.
///
/// # Example
/// ```
/// use minish::split_into_words;
/// let words = split_into_words(r#"echo 'hello   world' "it's" \"x\""#);
/// assert_eq!(words, ["echo", "hello   world", "it's", "\"x\""]);
/// ```
pub fn split_into_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();

    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;

    for ch in line.chars() {
        if escaped {
            word.push(ch);
            escaped = false;
        } else if ch == ESCAPE && !in_single {
            escaped = true;
        } else if ch == SINGLE_QUOTE && !in_double {
            in_single = !in_single;
        } else if ch == DOUBLE_QUOTE && !in_single {
            in_double = !in_double;
        } else if ch == SEPARATOR && !in_single && !in_double {
            if !word.is_empty() {
                words.push(std::mem::take(&mut word));
            }
        } else {
            word.push(ch);
        }
    }

    if !word.is_empty() {
        words.push(word);
    }

    words
}
