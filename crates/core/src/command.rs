//! Configured commands and `%1` placeholder substitution

use std::fmt;
use std::path::Path;

/// Token replaced by the watched file's absolute path
pub const PATH_PLACEHOLDER: &str = "%1";

/// One command: `[program, arg1, arg2, ...]`
///
/// An empty token list is representable so that a blank `-c ""` survives
/// parsing; the executor logs and skips it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    tokens: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a command line on whitespace
    ///
    /// No quoting is supported: `"deploy  %1 --now"` becomes
    /// `["deploy", "%1", "--now"]`.
    pub fn parse(line: &str) -> Self {
        Self::new(line.split_whitespace())
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Program name, if any
    pub fn program(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Token list with every placeholder replaced by `path`
    pub fn resolve(&self, path: &Path) -> Vec<String> {
        let path = path.to_string_lossy();
        self.tokens
            .iter()
            .map(|token| {
                if token == PATH_PLACEHOLDER {
                    path.to_string()
                } else {
                    token.clone()
                }
            })
            .collect()
    }
}

impl From<String> for CommandSpec {
    fn from(line: String) -> Self {
        Self::parse(&line)
    }
}

impl From<&str> for CommandSpec {
    fn from(line: &str) -> Self {
        Self::parse(line)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tokens.split_first() {
            Some((program, args)) => f.write_str(&format_command(program, args)),
            None => f.write_str("<empty>"),
        }
    }
}

/// Render a program and its arguments as a shell-like line
///
/// Arguments containing spaces are wrapped in double quotes.
pub fn format_command<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    let mut out = String::from(program);
    for arg in args {
        let arg = arg.as_ref();
        out.push(' ');
        if arg.contains(' ') {
            out.push('"');
            out.push_str(arg);
            out.push('"');
        } else {
            out.push_str(arg);
        }
    }
    out
}

/// Whether any command runs `program`
pub fn any_runs(commands: &[CommandSpec], program: &str) -> bool {
    commands.iter().any(|c| c.program() == Some(program))
}
