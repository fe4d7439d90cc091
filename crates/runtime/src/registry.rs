//! Word registry
//!
//! Two maps keyed by normalized name: builtins, fixed once the registry
//! is built, and user words, which can be added to, replaced wholesale,
//! or cleared at run time. Lookup checks user words first, so a user
//! definition shadows a builtin of the same name.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut builtins = Builtins::new();
//! builtins.register("dup", "native dup")?;
//! let mut registry = Registry::new(builtins);
//! registry.bind_user_definition("twice", "dup +")?;
//! assert!(registry.resolve("TWICE").is_some());
//! ```

use crate::compiler::{Body, compile_definition};
use crate::names::{normalize, validate_name};
use progcalc_core::Result;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Where a word came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Builtin,
    User,
}

/// A named, compiled operation together with its source text
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    name: String,
    body: Body,
    source: String,
    origin: Origin,
}

impl Word {
    /// Validate the name and compile the body
    fn compile(name: &str, source: &str, origin: Origin) -> Result<Word> {
        let name = validate_name(name)?;
        let body = compile_definition(&name, source)?;
        Ok(Word {
            name,
            body,
            source: source.to_string(),
            origin,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }
}

/// The builtin word set, populated before the registry is created
#[derive(Debug, Clone, Default)]
pub struct Builtins {
    words: HashMap<String, Word>,
}

impl Builtins {
    pub fn new() -> Self {
        Builtins::default()
    }

    /// Compile all definitions, failing on the first bad entry
    pub fn from_definitions(definitions: &BTreeMap<String, String>) -> Result<Builtins> {
        let mut builtins = Builtins::new();
        for (name, source) in definitions {
            builtins.register(name, source)?;
        }
        Ok(builtins)
    }

    /// Register one builtin word
    ///
    /// Rejects reserved and numeric names; the name is stored lowercased.
    pub fn register(&mut self, name: &str, source: &str) -> Result<()> {
        let word = Word::compile(name, source, Origin::Builtin)?;
        debug!(name = word.name(), "registered builtin");
        self.words.insert(word.name.clone(), word);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    builtins: Builtins,
    user: HashMap<String, Word>,
}

impl Registry {
    pub fn new(builtins: Builtins) -> Self {
        Registry {
            builtins,
            user: HashMap::new(),
        }
    }

    /// Replace the user word set with `definitions`
    ///
    /// Every entry is compiled before anything is assigned; if any entry
    /// fails the user words are left exactly as they were.
    pub fn load_user_definitions(&mut self, definitions: &BTreeMap<String, String>) -> Result<()> {
        let mut compiled = HashMap::with_capacity(definitions.len());
        for (name, source) in definitions {
            let word = Word::compile(name, source, Origin::User)?;
            compiled.insert(word.name.clone(), word);
        }

        debug!(count = compiled.len(), "loaded user definitions");
        self.user = compiled;
        Ok(())
    }

    /// Compile and bind one user word, replacing any previous entry
    pub fn bind_user_definition(&mut self, name: &str, source: &str) -> Result<()> {
        let word = Word::compile(name, source, Origin::User)?;
        debug!(name = word.name(), "bound user definition");
        self.user.insert(word.name.clone(), word);
        Ok(())
    }

    /// Look up a word, user definitions first
    pub fn resolve(&self, name: &str) -> Option<&Word> {
        let name = normalize(name);
        self.user
            .get(&name)
            .or_else(|| self.builtins.words.get(&name))
    }

    /// Source text of a word, user definitions first
    pub fn resolve_source(&self, name: &str) -> Option<&str> {
        self.resolve(name).map(Word::source)
    }

    /// Every resolvable name, each once
    pub fn list_names(&self) -> BTreeSet<String> {
        self.builtins
            .words
            .keys()
            .chain(self.user.keys())
            .cloned()
            .collect()
    }

    pub fn clear_user_definitions(&mut self) {
        debug!(count = self.user.len(), "cleared user definitions");
        self.user.clear();
    }

    /// User words as `name -> source`, the form that gets persisted
    pub fn user_definitions(&self) -> BTreeMap<String, String> {
        self.user
            .iter()
            .map(|(name, word)| (name.clone(), word.source.clone()))
            .collect()
    }

    pub fn is_user_defined(&self, name: &str) -> bool {
        self.user.contains_key(&normalize(name))
    }

    pub fn builtin_count(&self) -> usize {
        self.builtins.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Primitive;
    use progcalc_core::CalcError;

    fn registry() -> Registry {
        let mut builtins = Builtins::new();
        builtins.register("+", "native add").unwrap();
        builtins.register("DUP", "native dup").unwrap();
        Registry::new(builtins)
    }

    fn defs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_builtin_rejections() {
        let mut builtins = Builtins::new();
        assert!(matches!(
            builtins.register("reset", "native dup"),
            Err(CalcError::ReservedName(_))
        ));
        assert!(matches!(
            builtins.register("1.5", "native dup"),
            Err(CalcError::NumericName(_))
        ));
        assert!(matches!(
            builtins.register("bad", "native nope"),
            Err(CalcError::Compile(_))
        ));
        assert!(builtins.is_empty());
    }

    #[test]
    fn test_names_are_normalized() {
        let registry = registry();
        let word = registry.resolve("Dup").unwrap();
        assert_eq!(word.name(), "dup");
        assert_eq!(word.origin(), Origin::Builtin);
        assert_eq!(word.body(), &Body::Native(Primitive::Dup));
    }

    #[test]
    fn test_user_shadows_builtin() {
        let mut registry = registry();
        registry.bind_user_definition("+", "native subtract").unwrap();

        let word = registry.resolve("+").unwrap();
        assert_eq!(word.origin(), Origin::User);
        assert_eq!(registry.resolve_source("+"), Some("native subtract"));

        let names = registry.list_names();
        assert_eq!(names.iter().filter(|n| n.as_str() == "+").count(), 1);
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_bind_failure_keeps_previous() {
        let mut registry = registry();
        registry.bind_user_definition("twice", "dup +").unwrap();
        let err = registry
            .bind_user_definition("twice", "native bogus")
            .unwrap_err();
        assert!(matches!(err, CalcError::Compile(_)));
        assert_eq!(registry.resolve_source("twice"), Some("dup +"));
    }

    #[test]
    fn test_batch_load_is_atomic() {
        let mut registry = registry();
        registry.bind_user_definition("twice", "dup +").unwrap();
        let before = registry.user_definitions();

        let err = registry
            .load_user_definitions(&defs(&[("good", "1 +"), ("bad", "native nope")]))
            .unwrap_err();
        assert!(matches!(err, CalcError::Compile(_)));
        assert_eq!(registry.user_definitions(), before);
        assert!(registry.resolve("good").is_none());
    }

    #[test]
    fn test_batch_load_replaces_wholesale() {
        let mut registry = registry();
        registry.bind_user_definition("twice", "dup +").unwrap();
        registry
            .load_user_definitions(&defs(&[("Inc", "1 +")]))
            .unwrap();
        assert!(registry.resolve("twice").is_none());
        assert!(registry.is_user_defined("inc"));
        assert_eq!(
            registry.user_definitions(),
            defs(&[("inc", "1 +")])
        );
    }

    #[test]
    fn test_clear_user_keeps_builtins() {
        let mut registry = registry();
        registry.bind_user_definition("+", "native subtract").unwrap();
        registry.clear_user_definitions();
        assert_eq!(registry.resolve("+").unwrap().origin(), Origin::Builtin);
        assert_eq!(registry.builtin_count(), 2);
    }

    #[test]
    fn test_unknown_resolves_to_none() {
        let registry = registry();
        assert!(registry.resolve("nope").is_none());
        assert!(registry.resolve_source("nope").is_none());
    }
}
