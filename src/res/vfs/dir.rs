use std::fs;
use std::io::Read;
use std::path::PathBuf;

use crate::errors::*;

use super::super::locator::Locator;
use super::Vfs;

/// Local host filesystem. Relative paths are joined onto `root` if there is one.
#[derive(Debug, Default, Clone)]
pub struct Dir {
    root: Option<PathBuf>,
}

impl Dir {
    pub fn new() -> Self {
        Dir { root: None }
    }

    pub fn with_root<T: Into<PathBuf>>(root: T) -> Result<Self> {
        let root = root.into();
        info!("[Dir] creates directory based virtual file system at {:?}.", root);

        if fs::metadata(&root)?.is_dir() {
            Ok(Dir { root: Some(root) })
        } else {
            Err(Error::Malformed(format!(
                "Directory file-system must be associated with a readable directory, {:?} is not.",
                root
            )))
        }
    }

    fn resolve(&self, locator: &Locator) -> PathBuf {
        match self.root {
            Some(ref root) => root.join(locator.path()),
            None => PathBuf::from(locator.path()),
        }
    }
}

impl Vfs for Dir {
    fn read(&self, locator: &Locator) -> Result<Vec<u8>> {
        let path = self.resolve(locator);
        if !path.is_file() {
            return Err(Error::FileNotFound(path));
        }

        let mut file = fs::File::open(&path)?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn exists(&self, locator: &Locator) -> bool {
        self.resolve(locator).is_file()
    }
}
