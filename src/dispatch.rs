//! The `Dispatcher` fans out one fetch per queued item to the handler registered for
//! its resource type.

use std::sync::{Arc, RwLock};

use crate::registry::Registry;
use crate::tracker::{Completion, Tracker};
use crate::utils::FastHashMap;

/// Starts the fetch of a single item.
///
/// Implementations should return immediately and report back through `completion`
/// whenever the fetch finishes, possibly from another thread. A `Completion` which
/// is dropped without being signaled leaves its resource type unfinished forever.
pub trait FetchHandler: Send + Sync + 'static {
    fn fetch(&self, name: &str, locator: &str, completion: Completion);
}

impl<F> FetchHandler for F
where
    F: Fn(&str, &str, Completion) + Send + Sync + 'static,
{
    fn fetch(&self, name: &str, locator: &str, completion: Completion) {
        self(name, locator, completion)
    }
}

#[derive(Default)]
pub struct Dispatcher {
    handlers: RwLock<FastHashMap<String, Arc<dyn FetchHandler>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher::default()
    }

    /// Registers the fetch handler of `resource_type`, returns the replaced one if any.
    pub fn register<T, H>(&self, resource_type: T, handler: H) -> Option<Arc<dyn FetchHandler>>
    where
        T: Into<String>,
        H: FetchHandler,
    {
        let resource_type = resource_type.into();
        info!("[Dispatcher] registers fetch handler of {}.", resource_type);
        self.handlers
            .write()
            .unwrap()
            .insert(resource_type, Arc::new(handler))
    }

    pub fn unregister<T: AsRef<str>>(&self, resource_type: T) -> Option<Arc<dyn FetchHandler>> {
        self.handlers.write().unwrap().remove(resource_type.as_ref())
    }

    #[inline]
    pub fn has<T: AsRef<str>>(&self, resource_type: T) -> bool {
        self.handlers
            .read()
            .unwrap()
            .contains_key(resource_type.as_ref())
    }

    /// Invokes the registered handler once for every item of every queued type, and
    /// returns the number of issued fetches without waiting for any of them.
    ///
    /// Types without a handler are skipped, they will never finish. The registry lock
    /// is released before the first handler runs, so handlers are free to complete
    /// synchronously.
    pub fn run_dispatch(&self, registry: &RwLock<Registry>, tracker: &Arc<Tracker>) -> usize {
        let mut jobs = Vec::new();
        {
            let registry = registry.read().unwrap();
            let handlers = self.handlers.read().unwrap();

            for (resource_type, _) in registry.iter() {
                match handlers.get(resource_type) {
                    Some(handler) => {
                        for job in registry.jobs(resource_type) {
                            jobs.push((handler.clone(), job));
                        }
                    }
                    None => warn!(
                        "[Dispatcher] {} has no fetch handler, its items will never load.",
                        resource_type
                    ),
                }
            }
        }

        let num = jobs.len();
        debug!("[Dispatcher] issues {} fetches.", num);

        for (handler, job) in jobs {
            let completion = Completion::new(tracker.clone(), &job.resource_type, &job.name);
            handler.fetch(&job.name, &job.locator, completion);
        }

        num
    }
}
