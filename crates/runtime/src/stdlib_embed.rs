//! Embedded builtin library
//!
//! The default word definitions are compiled into the binary so the
//! calculator needs no external files to start.

use crate::annotated::parse_annotated;
use std::collections::BTreeMap;

/// Annotated source of the default builtin library
pub const BASE_DEFS: &str = include_str!("../stdlib/base.pcalc");

/// Default builtin definitions as `name -> body`
pub fn base_definitions() -> BTreeMap<String, String> {
    parse_annotated(BASE_DEFS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_library_words() {
        let defs = base_definitions();
        for name in [
            "dup", "drop", "swap", "clear", "+", "-", "*", "/", "neg", "empty", "@", "collect",
            "sum", "product", "count", "average",
        ] {
            assert!(defs.contains_key(name), "missing builtin {}", name);
        }
        assert_eq!(defs.len(), 16);
    }

    #[test]
    fn test_average_is_composite() {
        let defs = base_definitions();
        assert!(defs["average"].contains("dup sum swap count /"));
    }
}
