//! Calculator Error Kinds
//!
//! Every failure a word, the dispatcher, or the registry can raise.
//!
//! # Usage
//!
//! Word bodies report failure only by returning an error:
//! ```ignore
//! let (a, b) = stack.pop_two("+")?;
//! ```
//!
//! The dispatcher catches the error per line and reports it together with
//! the command that raised it.

use std::fmt;

/// A word body failed to compile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// Normalized name of the definition being compiled
    pub name: String,
    /// 1-based line within the definition body, if known
    pub line: Option<usize>,
    pub message: String,
}

impl CompileError {
    pub fn new(name: impl Into<String>, line: Option<usize>, message: impl Into<String>) -> Self {
        CompileError {
            name: name.into(),
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(
                f,
                "Error compiling definition for {} at line {}: {}",
                self.name, line, self.message
            ),
            None => write!(
                f,
                "Error compiling definition for {}: {}",
                self.name, self.message
            ),
        }
    }
}

impl std::error::Error for CompileError {}

/// Error type shared by the stack, the word library, the registry and the
/// dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum CalcError {
    /// Pop or peek on a stack holding fewer values than required
    StackUnderflow { needed: usize, depth: usize },
    /// Token is neither a number nor a resolvable word
    UnknownCommand(String),
    /// A definition body failed to compile
    Compile(CompileError),
    /// Name collides with a host control command
    ReservedName(String),
    /// Name parses as a number
    NumericName(String),
    /// Name is empty or contains whitespace
    InvalidName(String),
    /// Nested word invocations exceeded the configured depth
    RecursionLimit { word: String, limit: usize },
}

impl CalcError {
    pub fn underflow(needed: usize, depth: usize) -> Self {
        CalcError::StackUnderflow { needed, depth }
    }
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcError::StackUnderflow { .. } => write!(f, "Stack underflow"),
            CalcError::UnknownCommand(name) => write!(f, "Command {} is not defined", name),
            CalcError::Compile(e) => write!(f, "{}", e),
            CalcError::ReservedName(name) => {
                write!(f, "{} is a reserved command and cannot be redefined", name)
            }
            CalcError::NumericName(name) => {
                write!(f, "Numeric values cannot be used as commands: {}", name)
            }
            CalcError::InvalidName(name) => {
                write!(f, "Command name {:?} is empty or contains whitespace", name)
            }
            CalcError::RecursionLimit { word, limit } => write!(
                f,
                "Call depth limit of {} exceeded while invoking {}",
                limit, word
            ),
        }
    }
}

impl std::error::Error for CalcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CalcError::Compile(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CompileError> for CalcError {
    fn from(e: CompileError) -> Self {
        CalcError::Compile(e)
    }
}

/// Result alias used throughout the calculator crates
pub type Result<T> = std::result::Result<T, CalcError>;
