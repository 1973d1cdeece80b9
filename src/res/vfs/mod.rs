//! Pluggable virtual filesystems which resolve locators into bytes.

pub mod dir;
pub use self::dir::Dir;

pub mod memory;
pub use self::memory::Memory;

use std::sync::{Arc, RwLock};

use crate::errors::*;
use crate::utils::FastHashMap;

use super::locator::Locator;

/// The transport behind a schema. Implementations are called from worker threads.
pub trait Vfs: Send + Sync + 'static {
    /// Reads the whole file at locator.
    fn read(&self, locator: &Locator) -> Result<Vec<u8>>;

    /// Checks if the file exists.
    fn exists(&self, locator: &Locator) -> bool;
}

/// Maps schemas like `file` or `mem` to their filesystems.
#[derive(Default, Clone)]
pub struct SchemaResolver {
    schemas: Arc<RwLock<FastHashMap<String, Arc<dyn Vfs>>>>,
}

impl SchemaResolver {
    pub fn new() -> Self {
        SchemaResolver::default()
    }

    /// Add or replace the filesystem of `schema`.
    pub fn add<T1, T2>(&self, schema: T1, vfs: T2)
    where
        T1: Into<String>,
        T2: Vfs,
    {
        let schema = schema.into();
        info!("[SchemaResolver] mounts virtual file system {}.", schema);
        self.schemas.write().unwrap().insert(schema, Arc::new(vfs));
    }

    #[inline]
    pub fn has<T: AsRef<str>>(&self, schema: T) -> bool {
        self.schemas.read().unwrap().contains_key(schema.as_ref())
    }

    /// Gets the filesystem which serves `schema`.
    pub fn locate<T: AsRef<str>>(&self, schema: T) -> Result<Arc<dyn Vfs>> {
        let schema = schema.as_ref();
        self.schemas
            .read()
            .unwrap()
            .get(schema)
            .cloned()
            .ok_or_else(|| Error::SchemaNotFound(schema.to_owned()))
    }

    /// Reads the whole file at `locator` with the filesystem of its schema.
    pub fn read(&self, locator: &Locator) -> Result<Vec<u8>> {
        self.locate(locator.schema())?.read(locator)
    }
}
