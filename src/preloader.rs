use std::io::Read;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::dispatch::{Dispatcher, FetchHandler};
use crate::errors::*;
use crate::images::{ImageHandler, IMAGES};
use crate::registry::{Batch, Registry};
use crate::res::prelude::{Dir, SchemaResolver, Vfs};
use crate::resource::{self, Resource};
use crate::sched::prelude::{Latch, LockLatch, ScheduleSystem};
use crate::settings::PreloadParams;
use crate::tracker::{Lookup, Signal, Tracker};

/// Preloads batches of named resources, and signals once when all of them are ready.
///
/// Every `Preloader` owns its own registry, handlers, results and worker threads.
/// Dropping it blocks until the fetches in flight have finished.
pub struct Preloader {
    registry: Arc<RwLock<Registry>>,
    dispatcher: Dispatcher,
    tracker: Arc<Tracker>,
    schemas: SchemaResolver,
    sched: ScheduleSystem,
}

impl Preloader {
    /// Creates a new `Preloader`, with the `file` schema mounted and the `imgs` type
    /// registered.
    pub fn new(params: PreloadParams) -> Result<Self> {
        let sched = ScheduleSystem::new(params.workers, params.stack_size, None);

        let schemas = SchemaResolver::new();
        match params.root {
            Some(ref root) => schemas.add("file", Dir::with_root(root)?),
            None => schemas.add("file", Dir::new()),
        }

        let registry = Arc::new(RwLock::new(Registry::new()));
        let tracker = Arc::new(Tracker::new(
            registry.clone(),
            params.policy,
            params.fire_on_empty,
        ));

        let dispatcher = Dispatcher::new();
        dispatcher.register(IMAGES, ImageHandler::new(schemas.clone(), sched.shared()));

        info!(
            "[Preloader] creates preloader with {} workers ({:?}).",
            params.workers, params.policy
        );

        Ok(Preloader {
            registry,
            dispatcher,
            tracker,
            schemas,
            sched,
        })
    }

    /// Creates a `Preloader` which fetches inline on the thread calling `load`.
    pub fn headless() -> Result<Self> {
        Preloader::new(PreloadParams::headless())
    }

    /// Mounts a virtual filesystem serving locators of `schema`.
    pub fn mount<T1, T2>(&self, schema: T1, vfs: T2)
    where
        T1: Into<String>,
        T2: Vfs,
    {
        self.schemas.add(schema, vfs);
    }

    #[inline]
    pub fn schemas(&self) -> &SchemaResolver {
        &self.schemas
    }

    /// Registers or replaces the fetch handler of `resource_type`.
    pub fn register<T, H>(&self, resource_type: T, handler: H)
    where
        T: Into<String>,
        H: FetchHandler,
    {
        self.dispatcher.register(resource_type, handler);
    }

    /// Queues a batch of `name -> locator` items of `resource_type`.
    pub fn add<T: Into<String>>(&self, resource_type: T, batch: Batch) {
        self.registry.write().unwrap().add(resource_type, batch);
    }

    /// Queues every batch of a JSON manifest, see `Registry::add_manifest`.
    pub fn add_manifest<R: Read>(&self, reader: R) -> Result<usize> {
        self.registry.write().unwrap().add_manifest(reader)
    }

    /// Dispatches every queued item, and invokes `func` exactly once when every queued
    /// type has finished loading.
    ///
    /// Items are dispatched again on every call, queues are never cleared.
    pub fn load<F>(&self, func: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.dispatcher.run_dispatch(&self.registry, &self.tracker);
        self.tracker.check_and_fire(Some(Box::new(func)));
    }

    /// Dispatches every queued item without a callback.
    pub fn load_silent(&self) {
        self.dispatcher.run_dispatch(&self.registry, &self.tracker);
        self.tracker.check_and_fire(None);
    }

    /// Gets a preloaded item.
    #[inline]
    pub fn get_item<T1, T2>(&self, resource_type: T1, name: T2) -> Lookup
    where
        T1: AsRef<str>,
        T2: AsRef<str>,
    {
        self.tracker.get_item(resource_type, name)
    }

    /// Gets a preloaded item as its concrete resource type.
    pub fn get_as<R, T1, T2>(&self, resource_type: T1, name: T2) -> Option<Arc<R>>
    where
        R: Resource,
        T1: AsRef<str>,
        T2: AsRef<str>,
    {
        self.get_item(resource_type, name)
            .handle()
            .and_then(|v| resource::downcast::<R>(&v))
    }

    #[inline]
    pub fn expected_count<T: AsRef<str>>(&self, resource_type: T) -> usize {
        self.registry.read().unwrap().expected(resource_type)
    }

    #[inline]
    pub fn loaded_count<T: AsRef<str>>(&self, resource_type: T) -> usize {
        self.tracker.loaded(resource_type)
    }

    #[inline]
    pub fn failures<T: AsRef<str>>(&self, resource_type: T) -> Vec<(String, String)> {
        self.tracker.failures(resource_type)
    }

    /// The number of callbacks still waiting for completion.
    #[inline]
    pub fn armed_callbacks(&self) -> usize {
        self.tracker.armed()
    }

    /// Returns true if every queued type has finished loading.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.tracker.is_complete()
    }

    /// Returns true once the aggregate completion condition has held, whether or not a
    /// callback was armed at that moment. Stays true after more items are queued.
    #[inline]
    pub fn is_fired(&self) -> bool {
        self.tracker.signal() == Signal::Fired
    }

    /// Blocks current thread until every queued type finished loading, or `timeout`
    /// elapsed.
    ///
    /// This does not dispatch anything by itself. Under `CompletionPolicy::SingleCheck`
    /// it only succeeds if loading has completed already.
    pub fn wait_until_complete(&self, timeout: Duration) -> Result<()> {
        let latch = Arc::new(LockLatch::new());
        let tx = latch.clone();
        let id = self.tracker.check_and_fire(Some(Box::new(move || tx.set())));

        if latch.wait_timeout(timeout) {
            return Ok(());
        }

        // It could still fire between the timeout and here.
        if let Some(id) = id {
            if !self.tracker.disarm(id) && latch.is_set() {
                return Ok(());
            }
        }

        Err(Error::Timeout(timeout))
    }

    /// Blocks current thread until the fetches in flight have finished, then stops the
    /// worker threads. Later fetches run inline.
    pub fn terminate(&self) {
        self.sched.terminate();
    }
}
