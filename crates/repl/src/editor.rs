//! Editing a function body in $EDITOR

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::process::Command;
use tempfile::NamedTempFile;

const DEFAULT_EDITOR: &str = "vi";

#[derive(Debug)]
pub enum EditorError {
    /// $EDITOR could not be split into a command line
    BadCommand(String),
    Io(io::Error),
    /// The editor ran but exited unsuccessfully
    Failed(Option<i32>),
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::BadCommand(cmd) => write!(f, "Cannot parse editor command '{}'", cmd),
            EditorError::Io(e) => write!(f, "Editor failed: {}", e),
            EditorError::Failed(Some(code)) => write!(f, "Editor exited with code {}", code),
            EditorError::Failed(None) => write!(f, "Editor was terminated"),
        }
    }
}

impl std::error::Error for EditorError {}

impl From<io::Error> for EditorError {
    fn from(e: io::Error) -> Self {
        EditorError::Io(e)
    }
}

/// Program and leading arguments from an $EDITOR value such as `code --wait`
fn editor_command(editor: &str) -> Result<(String, Vec<String>), EditorError> {
    let mut parts = shlex::split(editor)
        .filter(|parts| !parts.is_empty())
        .ok_or_else(|| EditorError::BadCommand(editor.to_string()))?;
    let program = parts.remove(0);
    Ok((program, parts))
}

/// Open `text` in the user's editor and return what they saved
pub fn edit_text(text: &str) -> Result<String, EditorError> {
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| DEFAULT_EDITOR.to_string());
    let (program, args) = editor_command(&editor)?;

    let mut file = NamedTempFile::with_suffix(".pcalc")?;
    file.write_all(text.as_bytes())?;
    file.flush()?;

    let status = Command::new(&program).args(&args).arg(file.path()).status()?;
    if !status.success() {
        return Err(EditorError::Failed(status.code()));
    }

    Ok(fs::read_to_string(file.path())?)
}
