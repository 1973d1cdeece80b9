//! The `Registry` holds, per resource type, the batches queued for preloading and the
//! number of items expected to finish.

use std::io::Read;
use std::iter::FromIterator;

use crate::errors::*;
use crate::utils::{FastHashMap, FastHashSet};

/// One submitted group of named source locators. Item names are unique within a
/// batch, inserting an existing name replaces its locator.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Batch {
    entries: FastHashMap<String, String>,
}

impl Batch {
    pub fn new() -> Self {
        Batch::default()
    }

    /// Add or replace an item, returns the previous locator of `name` if any.
    pub fn insert<T1, T2>(&mut self, name: T1, locator: T2) -> Option<String>
    where
        T1: Into<String>,
        T2: Into<String>,
    {
        self.entries.insert(name.into(), locator.into())
    }

    /// Builder flavour of `insert`.
    pub fn with<T1, T2>(mut self, name: T1, locator: T2) -> Self
    where
        T1: Into<String>,
        T2: Into<String>,
    {
        self.insert(name, locator);
        self
    }

    #[inline]
    pub fn get<T: AsRef<str>>(&self, name: T) -> Option<&str> {
        self.entries.get(name.as_ref()).map(|v| v.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, locator)` pairs. The order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<T1, T2> FromIterator<(T1, T2)> for Batch
where
    T1: Into<String>,
    T2: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (T1, T2)>>(iter: I) -> Self {
        let mut batch = Batch::new();
        for (name, locator) in iter {
            batch.insert(name, locator);
        }
        batch
    }
}

impl From<FastHashMap<String, String>> for Batch {
    fn from(entries: FastHashMap<String, String>) -> Self {
        Batch { entries }
    }
}

/// Queued batches of a single resource type.
#[derive(Debug, Default)]
pub struct TypeQueue {
    batches: Vec<Batch>,
    expected: usize,
    names: FastHashSet<String>,
}

impl TypeQueue {
    /// Batches in insertion order.
    #[inline]
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// The sum of entry counts of every batch ever added.
    #[inline]
    pub fn expected(&self) -> usize {
        self.expected
    }
}

/// A `(type, name, locator)` triple ready to be handed to a fetch handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub resource_type: String,
    pub name: String,
    pub locator: String,
}

#[derive(Debug, Default)]
pub struct Registry {
    queues: FastHashMap<String, TypeQueue>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Appends `batch` to the queue of `resource_type`, and increases its expected count
    /// by the number of entries. Unknown types silently create a new queue.
    pub fn add<T: Into<String>>(&mut self, resource_type: T, batch: Batch) {
        let resource_type = resource_type.into();
        let queue = self.queues.entry(resource_type.clone()).or_default();

        for (name, _) in batch.iter() {
            if !queue.names.insert(name.to_owned()) {
                warn!(
                    "[Registry] item {} of {} has been queued already, the later load overwrites the earlier one.",
                    name, resource_type
                );
            }
        }

        queue.expected += batch.len();
        debug!(
            "[Registry] queues {} items of {} ({} expected).",
            batch.len(),
            resource_type,
            queue.expected
        );

        queue.batches.push(batch);
    }

    /// Reads batches from a JSON manifest shaped like `{ "<type>": [ { "<name>": "<locator>" } ] }`,
    /// every element of the array becomes a batch of its own. Returns the number of batches.
    pub fn add_manifest<R: Read>(&mut self, reader: R) -> Result<usize> {
        let manifest: FastHashMap<String, Vec<FastHashMap<String, String>>> =
            serde_json::from_reader(reader)?;

        let mut num = 0;
        for (resource_type, batches) in manifest {
            for batch in batches {
                self.add(resource_type.clone(), batch.into());
                num += 1;
            }
        }

        Ok(num)
    }

    /// Gets the expected item count of `resource_type`, zero if it has never been queued.
    #[inline]
    pub fn expected<T: AsRef<str>>(&self, resource_type: T) -> usize {
        self.queues
            .get(resource_type.as_ref())
            .map(|v| v.expected)
            .unwrap_or(0)
    }

    #[inline]
    pub fn get<T: AsRef<str>>(&self, resource_type: T) -> Option<&TypeQueue> {
        self.queues.get(resource_type.as_ref())
    }

    #[inline]
    pub fn contains<T: AsRef<str>>(&self, resource_type: T) -> bool {
        self.queues.contains_key(resource_type.as_ref())
    }

    /// Iterates every queued resource type.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeQueue)> {
        self.queues.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The number of distinct queued resource types.
    #[inline]
    pub fn len(&self) -> usize {
        self.queues.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    /// Flattens the queue of `resource_type` into jobs, batch by batch in insertion order.
    /// Queued batches are left untouched.
    pub fn jobs<T: AsRef<str>>(&self, resource_type: T) -> Vec<Job> {
        let resource_type = resource_type.as_ref();
        self.queues
            .get(resource_type)
            .map(|queue| {
                queue
                    .batches
                    .iter()
                    .flat_map(|batch| batch.iter())
                    .map(|(name, locator)| Job {
                        resource_type: resource_type.to_owned(),
                        name: name.to_owned(),
                        locator: locator.to_owned(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
