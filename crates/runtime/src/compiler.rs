//! Definition compiler
//!
//! Turns the text of a word body into a [`Body`] the dispatcher can run.
//!
//! Syntax:
//! ```text
//! // comments run to end of line
//! native <tag>          the whole body is one primitive
//! 2 * dup sum           otherwise: numbers are pushed, names are invoked
//! ```
//!
//! Names inside a composite body are looked up when the word runs, not
//! when it compiles, so a word may refer to words defined later and
//! user definitions shadow builtins inside composites too.

use crate::names::{is_control_word, normalize, parse_number};
use crate::primitives::Primitive;
use progcalc_core::CompileError;

const NATIVE: &str = "native";

/// One step of a composite body
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Push a numeric literal
    Push(f64),
    /// Invoke a word by normalized name
    Call(String),
}

/// Compiled word body
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Native(Primitive),
    Sequence(Vec<Instruction>),
}

/// A token together with its 1-based line in the body
struct Token<'a> {
    text: &'a str,
    line: usize,
}

fn strip_line_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Body text with every `//` comment removed
pub fn strip_comments(source: &str) -> String {
    source
        .lines()
        .map(strip_line_comment)
        .collect::<Vec<_>>()
        .join("\n")
}

fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        tokens.extend(
            strip_line_comment(line)
                .split_whitespace()
                .map(|text| Token {
                    text,
                    line: idx + 1,
                }),
        );
    }
    tokens
}

/// Compile the body of the word `name`
///
/// `name` is only used for error reporting and the self-call check; it
/// is expected to be normalized already.
pub fn compile_definition(name: &str, source: &str) -> Result<Body, CompileError> {
    let tokens = tokenize(source);

    if let Some(first) = tokens.first()
        && first.text.eq_ignore_ascii_case(NATIVE)
    {
        return compile_native(name, &tokens);
    }

    let mut instructions = Vec::with_capacity(tokens.len());
    for token in &tokens {
        if let Some(n) = parse_number(token.text) {
            instructions.push(Instruction::Push(n));
            continue;
        }

        let word = normalize(token.text);
        if word == NATIVE {
            return Err(CompileError::new(
                name,
                Some(token.line),
                "'native' must be the only statement in a body",
            ));
        }
        if is_control_word(&word) {
            return Err(CompileError::new(
                name,
                Some(token.line),
                format!("control command '{}' cannot be used inside a definition", word),
            ));
        }
        if word == name {
            return Err(CompileError::new(
                name,
                Some(token.line),
                format!("word '{}' calls itself", word),
            ));
        }
        instructions.push(Instruction::Call(word));
    }

    Ok(Body::Sequence(instructions))
}

fn compile_native(name: &str, tokens: &[Token<'_>]) -> Result<Body, CompileError> {
    let native_line = tokens[0].line;
    let tag = match tokens.get(1) {
        Some(tag) => tag,
        None => {
            return Err(CompileError::new(
                name,
                Some(native_line),
                "'native' requires a primitive tag",
            ));
        }
    };

    if let Some(extra) = tokens.get(2) {
        return Err(CompileError::new(
            name,
            Some(extra.line),
            format!("unexpected '{}' after native primitive", extra.text),
        ));
    }

    Primitive::from_tag(tag.text).map(Body::Native).ok_or_else(|| {
        CompileError::new(
            name,
            Some(tag.line),
            format!("unknown native primitive '{}'", tag.text),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_body() {
        let body = compile_definition("dup", "// copies the top\nnative dup\n").unwrap();
        assert_eq!(body, Body::Native(Primitive::Dup));
    }

    #[test]
    fn test_sequence_body() {
        let body = compile_definition("average", "dup sum swap COUNT /").unwrap();
        assert_eq!(
            body,
            Body::Sequence(vec![
                Instruction::Call("dup".to_string()),
                Instruction::Call("sum".to_string()),
                Instruction::Call("swap".to_string()),
                Instruction::Call("count".to_string()),
                Instruction::Call("/".to_string()),
            ])
        );
    }

    #[test]
    fn test_literals_in_sequence() {
        let body = compile_definition("double", "2 *  // times two").unwrap();
        assert_eq!(
            body,
            Body::Sequence(vec![
                Instruction::Push(2.0),
                Instruction::Call("*".to_string()),
            ])
        );
    }

    #[test]
    fn test_empty_body_is_noop() {
        let body = compile_definition("nothing", "// Write your command body here").unwrap();
        assert_eq!(body, Body::Sequence(Vec::new()));
    }

    #[test]
    fn test_unknown_primitive_reports_line() {
        let err = compile_definition("root", "// comment\n\nnative sqrt").unwrap_err();
        assert_eq!(err.name, "root");
        assert_eq!(err.line, Some(3));
        assert!(err.message.contains("sqrt"));
    }

    #[test]
    fn test_native_shape_errors() {
        assert!(compile_definition("a", "native").is_err());
        assert!(compile_definition("a", "native add dup").is_err());
        let err = compile_definition("a", "dup\nnative add").unwrap_err();
        assert_eq!(err.line, Some(2));
    }

    #[test]
    fn test_control_word_in_body() {
        let err = compile_definition("a", "1 save-func").unwrap_err();
        assert!(err.message.contains("save-func"));
    }

    #[test]
    fn test_strip_comments() {
        assert_eq!(strip_comments("1 2 // add\n// note\n+"), "1 2 \n\n+");
    }

    #[test]
    fn test_direct_self_call() {
        let err = compile_definition("loop", "1 + LOOP").unwrap_err();
        assert!(err.message.contains("calls itself"));
    }
}
