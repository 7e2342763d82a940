use std::collections::HashSet;
use thiserror::Error;

use crate::pr::FileChange;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("File is not part of this pull request: {0}")]
    UnknownFile(String),
}

/// The set of filenames chosen for checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    names: HashSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every file of the pull request.
    pub fn all(files: &[FileChange]) -> Self {
        Self {
            names: files.iter().map(|f| f.filename.clone()).collect(),
        }
    }

    /// Select the given names, rejecting any that the pull request does not contain.
    pub fn from_names<I, S>(files: &[FileChange], names: I) -> Result<Self, SelectionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::new();
        for name in names {
            let name = name.into();
            if !files.iter().any(|f| f.filename == name) {
                return Err(SelectionError::UnknownFile(name));
            }
            selection.insert(name);
        }
        Ok(selection)
    }

    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.names.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
