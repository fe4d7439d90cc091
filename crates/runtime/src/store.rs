//! Persistence of user definitions
//!
//! The calculator hands user words to a store as a plain `name -> source`
//! map and gets the same shape back. The map is kept as a JSON object
//! under the fixed key [`STORE_KEY`].
//!
//! An absent or empty record loads as `{}`. A record that does not parse
//! also loads as `{}`; the store then overwrites it with `{}` so the same
//! warning does not come back on every start.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key the user definitions are stored under
pub const STORE_KEY: &str = "program";

pub type Definitions = BTreeMap<String, String>;

/// Error while writing user definitions
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "Failed to write user definitions: {}", e),
            StoreError::Json(e) => write!(f, "Failed to encode user definitions: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}

/// Where user definitions live between sessions
pub trait DefinitionStore {
    /// Saved definitions; never fails, a bad record reads as empty
    fn load(&self) -> Definitions;

    fn save(&self, definitions: &Definitions) -> Result<(), StoreError>;
}

/// Result of decoding a raw record
enum Decoded {
    Definitions(Definitions),
    Corrupt(serde_json::Error),
}

fn decode(raw: &str) -> Decoded {
    if raw.trim().is_empty() {
        return Decoded::Definitions(Definitions::new());
    }
    match serde_json::from_str(raw) {
        Ok(definitions) => Decoded::Definitions(definitions),
        Err(e) => Decoded::Corrupt(e),
    }
}

fn encode(definitions: &Definitions) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(definitions)?)
}

/// JSON file at `<dir>/program.json`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store inside `dir`, named after [`STORE_KEY`]
    pub fn in_dir(dir: &Path) -> Self {
        JsonFileStore {
            path: dir.join(format!("{}.json", STORE_KEY)),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_raw(&self, raw: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl DefinitionStore for JsonFileStore {
    fn load(&self) -> Definitions {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved user definitions");
                return Definitions::new();
            }
            Err(e) => {
                warn!("Could not read {}: {}", self.path.display(), e);
                return Definitions::new();
            }
        };

        match decode(&raw) {
            Decoded::Definitions(definitions) => definitions,
            Decoded::Corrupt(e) => {
                warn!(
                    "Saved user definitions in {} are corrupt ({}); resetting",
                    self.path.display(),
                    e
                );
                if let Err(e) = self.write_raw("{}") {
                    warn!("Could not reset {}: {}", self.path.display(), e);
                }
                Definitions::new()
            }
        }
    }

    fn save(&self, definitions: &Definitions) -> Result<(), StoreError> {
        let raw = encode(definitions)?;
        self.write_raw(&raw)?;
        debug!(path = %self.path.display(), count = definitions.len(), "saved user definitions");
        Ok(())
    }
}

/// In-process store holding the raw JSON record
#[derive(Debug, Default)]
pub struct MemoryStore {
    raw: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Store seeded with an arbitrary raw record
    pub fn with_raw(raw: impl Into<String>) -> Self {
        MemoryStore {
            raw: RefCell::new(Some(raw.into())),
        }
    }

    /// Current raw record, if any
    pub fn raw(&self) -> Option<String> {
        self.raw.borrow().clone()
    }
}

impl DefinitionStore for MemoryStore {
    fn load(&self) -> Definitions {
        let decoded = match self.raw.borrow().as_deref() {
            None => return Definitions::new(),
            Some(raw) => decode(raw),
        };

        match decoded {
            Decoded::Definitions(definitions) => definitions,
            Decoded::Corrupt(e) => {
                warn!("Saved user definitions are corrupt ({}); resetting", e);
                *self.raw.borrow_mut() = Some("{}".to_string());
                Definitions::new()
            }
        }
    }

    fn save(&self, definitions: &Definitions) -> Result<(), StoreError> {
        *self.raw.borrow_mut() = Some(encode(definitions)?);
        Ok(())
    }
}
