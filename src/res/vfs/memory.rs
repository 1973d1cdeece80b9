use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::errors::*;
use crate::utils::FastHashMap;

use super::super::locator::Locator;
use super::Vfs;

/// An in-process filesystem keyed by locator path. Clones share the same files.
#[derive(Debug, Default, Clone)]
pub struct Memory {
    files: Arc<RwLock<FastHashMap<String, Arc<[u8]>>>>,
}

impl Memory {
    pub fn new() -> Self {
        Memory::default()
    }

    /// Add or replace the file at `path`.
    pub fn insert<T1, T2>(&self, path: T1, bytes: T2)
    where
        T1: Into<String>,
        T2: Into<Vec<u8>>,
    {
        let bytes: Vec<u8> = bytes.into();
        self.files
            .write()
            .unwrap()
            .insert(path.into(), bytes.into());
    }

    pub fn remove<T: AsRef<str>>(&self, path: T) -> bool {
        self.files.write().unwrap().remove(path.as_ref()).is_some()
    }
}

impl Vfs for Memory {
    fn read(&self, locator: &Locator) -> Result<Vec<u8>> {
        self.files
            .read()
            .unwrap()
            .get(locator.path())
            .map(|v| v.to_vec())
            .ok_or_else(|| Error::FileNotFound(PathBuf::from(locator.path())))
    }

    fn exists(&self, locator: &Locator) -> bool {
        self.files.read().unwrap().contains_key(locator.path())
    }
}
