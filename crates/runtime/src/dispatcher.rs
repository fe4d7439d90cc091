//! Command line dispatcher
//!
//! Tokens are consumed left to right. A finite number is pushed; anything
//! else is resolved as a word and run against the live stack. The first
//! failure aborts the rest of the line:
//!
//! ```text
//! Running --number/word ok--> Running
//! Running --failure---------> Aborted   (remaining tokens skipped)
//! Running --tokens consumed-> Done
//! ```
//!
//! Nothing is rolled back. Whatever the failing word already popped or
//! pushed stays that way, and the stack is always left for the caller to
//! inspect.

use crate::compiler::{Body, Instruction};
use crate::names::{normalize, parse_number};
use crate::registry::{Registry, Word};
use progcalc_core::{CalcError, Result, Stack, Value};
use std::fmt;
use tracing::debug;

/// Default nesting limit for composite words
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// End state of one command line
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Every token ran
    Done,
    /// A token failed; `skipped` tokens after it never ran
    Aborted {
        command: String,
        error: CalcError,
        skipped: usize,
    },
}

impl Outcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done)
    }

    /// Human-readable status line for the host
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Done => write!(f, "OK"),
            Outcome::Aborted { command, error, .. } => {
                write!(f, "Error in {}: {}", command, error)
            }
        }
    }
}

pub struct Dispatcher<'a> {
    registry: &'a Registry,
    max_call_depth: usize,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Dispatcher {
            registry,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Run one command line against `stack`
    pub fn execute_line(&self, stack: &mut Stack, line: &str) -> Outcome {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        for (idx, token) in tokens.iter().enumerate() {
            if let Err(error) = self.invoke(stack, token) {
                let skipped = tokens.len() - idx - 1;
                debug!(token, %error, skipped, "line aborted");
                return Outcome::Aborted {
                    command: normalize(token),
                    error,
                    skipped,
                };
            }
        }

        Outcome::Done
    }

    /// Evaluate a single token
    pub fn invoke(&self, stack: &mut Stack, token: &str) -> Result<()> {
        if let Some(n) = parse_number(token) {
            stack.push(Value::Scalar(n));
            return Ok(());
        }

        debug!(token, depth = stack.depth(), "dispatching word");
        let word = self.lookup(token)?;
        self.run_word(stack, word)
    }

    fn lookup(&self, name: &str) -> Result<&'a Word> {
        self.registry
            .resolve(name)
            .ok_or_else(|| CalcError::UnknownCommand(normalize(name)))
    }

    /// Run a word and everything it calls
    ///
    /// Composite bodies are walked with an explicit frame stack, so call
    /// depth is limited by `max_call_depth` rather than the thread stack.
    fn run_word(&self, stack: &mut Stack, word: &'a Word) -> Result<()> {
        let mut frames: Vec<Frame<'a>> = Vec::new();
        self.enter(stack, word, &mut frames)?;

        while let Some(frame) = frames.last_mut() {
            let body = frame.body;
            let Some(instruction) = body.get(frame.pc) else {
                frames.pop();
                continue;
            };
            frame.pc += 1;

            match instruction {
                Instruction::Push(n) => stack.push(Value::Scalar(*n)),
                Instruction::Call(name) => {
                    let callee = self.lookup(name)?;
                    self.enter(stack, callee, &mut frames)?;
                }
            }
        }
        Ok(())
    }

    /// Apply a native word, or push a frame for a composite one
    fn enter(
        &self,
        stack: &mut Stack,
        word: &'a Word,
        frames: &mut Vec<Frame<'a>>,
    ) -> Result<()> {
        if frames.len() >= self.max_call_depth {
            return Err(CalcError::RecursionLimit {
                word: word.name().to_string(),
                limit: self.max_call_depth,
            });
        }

        match word.body() {
            Body::Native(primitive) => primitive.apply(stack),
            Body::Sequence(instructions) => {
                frames.push(Frame {
                    body: instructions,
                    pc: 0,
                });
                Ok(())
            }
        }
    }
}

/// A composite body being run, with the index of its next instruction
struct Frame<'a> {
    body: &'a [Instruction],
    pc: usize,
}
