// src/core/arguments.rs

//! Command-line encoding and splitting under the MSVC argv rules.
//!
//! `encode_arguments` turns an argument list into a single command line; `split_command_line`
//! parses such a line back into its arguments. For every input list,
//! `split_command_line(&encode_arguments(list)) == list`.

use std::iter::Peekable;
use std::str::Chars;

/// Encodes a list of arguments into one command line.
///
/// Arguments are separated by a single space. An argument with no whitespace and no
/// quote is emitted verbatim; anything else (including the empty argument) is quoted,
/// with backslash runs doubled only where they precede a quote.
pub fn encode_arguments<S: AsRef<str>>(args: &[S]) -> String {
    let mut command_line = String::with_capacity(args.iter().map(|a| a.as_ref().len() + 3).sum());
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            command_line.push(' ');
        }
        append_argument(&mut command_line, arg.as_ref());
    }
    command_line
}

/// Whether an argument must be wrapped in quotes to survive splitting.
fn needs_quoting(arg: &str) -> bool {
    arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"')
}

fn append_argument(command_line: &mut String, arg: &str) {
    if !needs_quoting(arg) {
        command_line.push_str(arg);
        return;
    }

    command_line.push('"');
    let mut chars = arg.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let run = 1 + count_backslashes(&mut chars);
                match chars.peek() {
                    // The closing quote follows: every backslash must be doubled.
                    None => push_backslashes(command_line, run * 2),
                    Some('"') => {
                        chars.next();
                        push_backslashes(command_line, run * 2 + 1);
                        command_line.push('"');
                    }
                    Some(_) => push_backslashes(command_line, run),
                }
            }
            '"' => command_line.push_str("\\\""),
            other => command_line.push(other),
        }
    }
    command_line.push('"');
}

/// Consumes consecutive backslashes and returns how many were consumed.
fn count_backslashes(chars: &mut Peekable<Chars<'_>>) -> usize {
    let mut count = 0;
    while chars.next_if_eq(&'\\').is_some() {
        count += 1;
    }
    count
}

fn push_backslashes(target: &mut String, count: usize) {
    target.extend(std::iter::repeat_n('\\', count));
}

fn is_separator(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Splits a command line into arguments following the MSVC runtime rules.
///
/// - Space and tab separate arguments outside quotes.
/// - `2n` backslashes before a quote yield `n` backslashes and the quote toggles quoting.
/// - `2n + 1` backslashes before a quote yield `n` backslashes and a literal quote.
/// - Backslashes not followed by a quote are literal.
/// - Inside a quoted run, `""` yields one literal quote.
pub fn split_command_line(command_line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut chars = command_line.chars().peekable();

    loop {
        while chars.next_if(|c| is_separator(*c)).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut arg = String::new();
        let mut in_quotes = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    let run = 1 + count_backslashes(&mut chars);
                    if chars.peek() == Some(&'"') {
                        push_backslashes(&mut arg, run / 2);
                        if run % 2 == 1 {
                            chars.next();
                            arg.push('"');
                        }
                    } else {
                        push_backslashes(&mut arg, run);
                    }
                }
                '"' => {
                    if in_quotes && chars.peek() == Some(&'"') {
                        chars.next();
                        arg.push('"');
                    } else {
                        in_quotes = !in_quotes;
                    }
                }
                c if is_separator(c) && !in_quotes => break,
                other => arg.push(other),
            }
        }
        args.push(arg);
    }

    args
}
