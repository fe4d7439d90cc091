//! Calculator session
//!
//! One `Calculator` owns the stack and the word registry for a session.
//! Hosts keep one per user and route every evaluated line through
//! [`Calculator::execute`].

use crate::annotated::parse_annotated;
use crate::config::CalcConfig;
use crate::dispatcher::{DEFAULT_MAX_CALL_DEPTH, Dispatcher, Outcome};
use crate::registry::{Builtins, Registry};
use crate::stdlib_embed::base_definitions;
use crate::store::DefinitionStore;
use progcalc_core::{CalcError, Stack};
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

/// Failure to bring up a session
#[derive(Debug)]
pub enum InitError {
    /// The configured builtin definitions file could not be read
    Io { path: PathBuf, error: std::io::Error },
    /// A builtin definition was rejected
    Builtin(CalcError),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::Io { path, error } => write!(
                f,
                "Failed to read builtin definitions {}: {}",
                path.display(),
                error
            ),
            InitError::Builtin(e) => write!(f, "Error loading builtin definitions: {}", e),
        }
    }
}

impl std::error::Error for InitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InitError::Io { error, .. } => Some(error),
            InitError::Builtin(e) => Some(e),
        }
    }
}

impl From<CalcError> for InitError {
    fn from(e: CalcError) -> Self {
        InitError::Builtin(e)
    }
}

#[derive(Debug, Clone)]
pub struct Calculator {
    stack: Stack,
    registry: Registry,
    max_call_depth: usize,
}

impl Calculator {
    /// Session over an already built registry
    pub fn new(registry: Registry) -> Self {
        Calculator {
            stack: Stack::new(),
            registry,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    /// Session with only the embedded builtin library
    pub fn with_base_library() -> Result<Self, InitError> {
        let builtins = Builtins::from_definitions(&base_definitions())?;
        Ok(Calculator::new(Registry::new(builtins)))
    }

    /// Load builtins and user words and return a ready session
    ///
    /// This is the one blocking step: nothing can be dispatched until the
    /// builtin definitions are read and compiled. User words that fail to
    /// compile are logged and skipped; the store is left untouched so the
    /// record can still be repaired.
    pub fn initialize(config: &CalcConfig, store: &dyn DefinitionStore) -> Result<Self, InitError> {
        let definitions = match &config.builtin_defs {
            Some(path) => {
                let source = std::fs::read_to_string(path).map_err(|error| InitError::Io {
                    path: path.clone(),
                    error,
                })?;
                parse_annotated(&source)
            }
            None => base_definitions(),
        };
        let builtins = Builtins::from_definitions(&definitions)?;

        let mut registry = Registry::new(builtins);
        let user = store.load();
        if let Err(e) = registry.load_user_definitions(&user) {
            warn!("Skipping saved user definitions: {}", e);
        }

        info!(
            builtins = registry.builtin_count(),
            user = registry.user_definitions().len(),
            "Local definitions loaded and merged"
        );

        Ok(Calculator::new(registry).with_max_call_depth(config.max_call_depth))
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Evaluate one command line
    pub fn execute(&mut self, line: &str) -> Outcome {
        Dispatcher::new(&self.registry)
            .with_max_call_depth(self.max_call_depth)
            .execute_line(&mut self.stack, line)
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }
}
