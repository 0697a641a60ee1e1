use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::InputError;

/// Where the raw input text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Clipboard,
    Stdin,
    File(PathBuf),
}

impl Source {
    pub fn acquire(&self) -> Result<String, InputError> {
        let data = match self {
            Source::Clipboard => read_clipboard()?,
            Source::Stdin => read_stdin()?,
            Source::File(path) => read_file(path)?,
        };
        debug!(source = ?self, bytes = data.len(), "acquired raw input");
        Ok(data)
    }
}

fn read_file(path: &Path) -> Result<String, InputError> {
    std::fs::read_to_string(path).map_err(|error| match error.kind() {
        ErrorKind::NotFound => InputError::FileNotFound(path.to_path_buf()),
        _ => InputError::Read {
            source_name: path.display().to_string(),
            error,
        },
    })
}

fn read_stdin() -> Result<String, InputError> {
    let mut data = String::new();
    std::io::stdin()
        .read_to_string(&mut data)
        .map_err(|error| InputError::Read {
            source_name: "stdin".to_string(),
            error,
        })?;
    Ok(data)
}

fn read_clipboard() -> Result<String, InputError> {
    let mut clipboard = arboard::Clipboard::new()?;
    Ok(clipboard.get_text()?)
}
