//! progcalc runtime: words, the registry and the dispatcher
//!
//! Builds on `progcalc-core` to evaluate command lines such as
//! `1 2 3 collect 2 *` against a session stack.
//!
//! # Modules
//!
//! - `names`: numeric literal detection, name normalization and validation
//! - `primitives`: the closed set of native operations
//! - `compiler`: definition text to executable body
//! - `annotated`: the `//@ name` multi-definition file format
//! - `stdlib_embed`: the default builtin library
//! - `registry`: builtin and user words with shadowing
//! - `dispatcher`: per-line evaluation with abort-on-first-failure
//! - `session`: the `Calculator` context object
//! - `store`: persistence boundary for user words
//! - `config`: settings file and defaults

pub mod annotated;
pub mod compiler;
pub mod config;
pub mod dispatcher;
pub mod names;
pub mod primitives;
pub mod registry;
pub mod session;
pub mod stdlib_embed;
pub mod store;

pub use compiler::{Body, Instruction, compile_definition, strip_comments};
pub use config::{CalcConfig, ConfigError};
pub use dispatcher::{Dispatcher, Outcome};
pub use names::{CONTROL_WORDS, is_control_word, parse_number, validate_name};
pub use primitives::Primitive;
pub use registry::{Builtins, Origin, Registry, Word};
pub use session::{Calculator, InitError};
pub use store::{DefinitionStore, JsonFileStore, MemoryStore, StoreError};

pub use progcalc_core::{CalcError, CompileError, Stack, Value};
