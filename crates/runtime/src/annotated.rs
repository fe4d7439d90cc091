//! Annotated definition files
//!
//! The builtin library is one text file holding many named bodies. A line
//! starting with `//@ ` opens a block named by the next token; every line
//! up to the next marker belongs to that block. Lines before the first
//! marker are a preamble and are dropped.
//!
//! ```text
//! // preamble, ignored
//! //@ dup
//! // Copies the top-most element of the stack
//! native dup
//!
//! //@ average
//! dup sum swap count /
//! ```

use std::collections::BTreeMap;

const MARKER: &str = "//@ ";

/// Split annotated source into `name -> body` pairs
///
/// A later block with the same name replaces an earlier one.
pub fn parse_annotated(source: &str) -> BTreeMap<String, String> {
    let mut definitions = BTreeMap::new();
    let mut current: Option<&str> = None;
    let mut lines: Vec<&str> = Vec::new();

    for line in source.lines() {
        if let Some(rest) = line.strip_prefix(MARKER) {
            if let Some(name) = current.take() {
                definitions.insert(name.to_string(), lines.join("\n"));
            }
            lines.clear();
            current = rest.split_whitespace().next();
        } else {
            lines.push(line);
        }
    }

    if let Some(name) = current {
        definitions.insert(name.to_string(), lines.join("\n"));
    }

    definitions
}
