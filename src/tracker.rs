//! The completion tracker records every finished item and fires the caller's callbacks
//! once every queued type reached its expected count.
//!
//! Each resource type is either `Pending` or `Satisfied`. A type is satisfied once the
//! number of distinct items stored for it equals its expected count, which makes types
//! whose items are all duplicated names or which have no handler pending forever. The
//! aggregate signal goes from `Pending` to `Fired` the first time every queued type is
//! satisfied, and never goes back.

use std::fmt;
use std::sync::{Arc, Mutex, RwLock};

use crate::registry::Registry;
use crate::resource::{Resource, ResourceHandle};
use crate::settings::CompletionPolicy;
use crate::utils::FastHashMap;

/// A one-shot completion callback.
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Identifies an armed callback, see `Tracker::disarm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeState {
    Pending,
    Satisfied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Pending,
    Fired,
}

/// The result of looking up a preloaded item.
#[derive(Clone)]
pub enum Lookup {
    /// The item has finished loading.
    Found(ResourceHandle),
    /// The resource type is known, but the item has not finished loading (or was never
    /// queued).
    NotFound,
    /// Nothing is known about the resource type.
    Unknown,
}

impl Lookup {
    #[inline]
    pub fn is_found(&self) -> bool {
        match *self {
            Lookup::Found(_) => true,
            _ => false,
        }
    }

    /// Converts into the handle, collapsing both kinds of absence into `None`.
    #[inline]
    pub fn handle(self) -> Option<ResourceHandle> {
        match self {
            Lookup::Found(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Debug for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Lookup::Found(ref v) => write!(f, "Found({})", v.name()),
            Lookup::NotFound => write!(f, "NotFound"),
            Lookup::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Default)]
struct TrackerState {
    stores: FastHashMap<String, FastHashMap<String, ResourceHandle>>,
    failures: FastHashMap<String, Vec<(String, String)>>,
    armed: Vec<(CallbackId, Callback)>,
    next_id: u64,
    fired: bool,
}

pub struct Tracker {
    registry: Arc<RwLock<Registry>>,
    policy: CompletionPolicy,
    fire_on_empty: bool,
    state: Mutex<TrackerState>,
}

impl Tracker {
    pub fn new(
        registry: Arc<RwLock<Registry>>,
        policy: CompletionPolicy,
        fire_on_empty: bool,
    ) -> Self {
        Tracker {
            registry,
            policy,
            fire_on_empty,
            state: Mutex::new(TrackerState::default()),
        }
    }

    #[inline]
    pub fn policy(&self) -> CompletionPolicy {
        self.policy
    }

    /// Records a finished item, overwriting any prior value stored under `name`. Under
    /// `CompletionPolicy::Recheck` every armed callback fires if this was the last
    /// missing item.
    pub fn on_item_complete(&self, resource_type: &str, name: &str, handle: ResourceHandle) {
        let fired = {
            let mut state = self.state.lock().unwrap();
            let prev = state
                .stores
                .entry(resource_type.to_owned())
                .or_default()
                .insert(name.to_owned(), handle);

            if prev.is_some() {
                debug!("[Tracker] {} of {} has been overwritten.", name, resource_type);
            }

            match self.policy {
                CompletionPolicy::Recheck => self.evaluate(&mut state),
                CompletionPolicy::SingleCheck => Vec::new(),
            }
        };

        Tracker::fire(fired);
    }

    /// Records a failed item. It never counts towards completion.
    pub fn on_item_failed(&self, resource_type: &str, name: &str, err: &failure::Error) {
        warn!("[Tracker] failed to load {} of {}. {}", name, resource_type, err);
        self.state
            .lock()
            .unwrap()
            .failures
            .entry(resource_type.to_owned())
            .or_default()
            .push((name.to_owned(), err.to_string()));
    }

    /// Arms `callback` and fires it right away if every queued type is satisfied.
    /// Returns the id of the callback if it stays armed.
    ///
    /// Nothing fires if no type has been queued, unless the tracker was created with
    /// `fire_on_empty`. Under `CompletionPolicy::SingleCheck`, a callback which does not
    /// fire here is dropped and will never fire.
    pub fn check_and_fire(&self, callback: Option<Callback>) -> Option<CallbackId> {
        let (id, fired) = {
            let mut state = self.state.lock().unwrap();
            let id = callback.map(|v| {
                let id = CallbackId(state.next_id);
                state.next_id += 1;
                state.armed.push((id, v));
                id
            });

            let fired = self.evaluate(&mut state);
            if self.policy == CompletionPolicy::SingleCheck && !state.armed.is_empty() {
                debug!(
                    "[Tracker] preloading is still pending, drops {} callbacks.",
                    state.armed.len()
                );
                state.armed.clear();
            }

            let id = id.filter(|id| state.armed.iter().any(|v| v.0 == *id));
            (id, fired)
        };

        Tracker::fire(fired);
        id
    }

    /// Drops an armed callback without firing it. Returns false if it has fired or
    /// been dropped already.
    pub fn disarm(&self, id: CallbackId) -> bool {
        let mut state = self.state.lock().unwrap();
        let len = state.armed.len();
        state.armed.retain(|v| v.0 != id);
        state.armed.len() != len
    }

    /// The number of callbacks waiting for completion.
    #[inline]
    pub fn armed(&self) -> usize {
        self.state.lock().unwrap().armed.len()
    }

    /// Returns true if every queued type is satisfied.
    pub fn is_complete(&self) -> bool {
        let state = self.state.lock().unwrap();
        let registry = self.registry.read().unwrap();
        Tracker::satisfied(&state, &registry)
    }

    /// Returns the aggregate signal, which stays `Fired` once it has been.
    #[inline]
    pub fn signal(&self) -> Signal {
        if self.state.lock().unwrap().fired {
            Signal::Fired
        } else {
            Signal::Pending
        }
    }

    pub fn type_state<T: AsRef<str>>(&self, resource_type: T) -> TypeState {
        let resource_type = resource_type.as_ref();
        let loaded = self.loaded(resource_type);
        if loaded == self.registry.read().unwrap().expected(resource_type) {
            TypeState::Satisfied
        } else {
            TypeState::Pending
        }
    }

    /// The number of distinct items stored for `resource_type`.
    pub fn loaded<T: AsRef<str>>(&self, resource_type: T) -> usize {
        self.state
            .lock()
            .unwrap()
            .stores
            .get(resource_type.as_ref())
            .map(|v| v.len())
            .unwrap_or(0)
    }

    /// `(name, reason)` pairs of every failed fetch of `resource_type`.
    pub fn failures<T: AsRef<str>>(&self, resource_type: T) -> Vec<(String, String)> {
        self.state
            .lock()
            .unwrap()
            .failures
            .get(resource_type.as_ref())
            .cloned()
            .unwrap_or_default()
    }

    /// Gets the stored handle of an item. The type counts as known once it has been
    /// queued or any of its items has finished.
    pub fn get_item<T1, T2>(&self, resource_type: T1, name: T2) -> Lookup
    where
        T1: AsRef<str>,
        T2: AsRef<str>,
    {
        let resource_type = resource_type.as_ref();
        let state = self.state.lock().unwrap();

        match state.stores.get(resource_type) {
            Some(store) => match store.get(name.as_ref()) {
                Some(handle) => Lookup::Found(handle.clone()),
                None => Lookup::NotFound,
            },
            None => {
                if self.registry.read().unwrap().contains(resource_type) {
                    Lookup::NotFound
                } else {
                    Lookup::Unknown
                }
            }
        }
    }

    // Drains armed callbacks if the aggregate condition holds, they must be invoked
    // after `state` is unlocked.
    fn evaluate(&self, state: &mut TrackerState) -> Vec<Callback> {
        let registry = self.registry.read().unwrap();

        let ready = if registry.is_empty() {
            if !self.fire_on_empty && !state.armed.is_empty() {
                debug!(
                    "[Tracker] nothing has been queued, drops {} callbacks.",
                    state.armed.len()
                );
                state.armed.clear();
            }

            self.fire_on_empty
        } else {
            Tracker::satisfied(state, &registry)
        };

        if !ready {
            return Vec::new();
        }

        if !state.fired {
            state.fired = true;
            info!("[Tracker] all {} types are ready.", registry.len());
        }

        state.armed.drain(..).map(|v| v.1).collect()
    }

    fn satisfied(state: &TrackerState, registry: &Registry) -> bool {
        if registry.is_empty() {
            return false;
        }

        let finished = registry
            .iter()
            .filter(|&(resource_type, queue)| {
                let loaded = state
                    .stores
                    .get(resource_type)
                    .map(|v| v.len())
                    .unwrap_or(0);
                loaded == queue.expected()
            })
            .count();

        finished == registry.len()
    }

    fn fire(callbacks: Vec<Callback>) {
        for v in callbacks {
            v();
        }
    }
}

/// The one-shot notification handed to a `FetchHandler` for every item it fetches.
pub struct Completion {
    tracker: Arc<Tracker>,
    resource_type: String,
    name: String,
    signaled: bool,
}

impl Completion {
    pub fn new(tracker: Arc<Tracker>, resource_type: &str, name: &str) -> Self {
        Completion {
            tracker,
            resource_type: resource_type.to_owned(),
            name: name.to_owned(),
            signaled: false,
        }
    }

    #[inline]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signals that the fetch succeeded with `resource`.
    pub fn complete<T: Resource>(self, resource: T) {
        self.complete_with(Arc::new(resource))
    }

    /// Signals that the fetch succeeded with an existing handle.
    pub fn complete_with(mut self, handle: ResourceHandle) {
        self.signaled = true;
        self.tracker
            .on_item_complete(&self.resource_type, &self.name, handle);
    }

    /// Signals that the fetch failed.
    pub fn fail<E: Into<failure::Error>>(mut self, err: E) {
        self.signaled = true;
        self.tracker
            .on_item_failed(&self.resource_type, &self.name, &err.into());
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if !self.signaled {
            warn!(
                "[Tracker] fetch of {} ({}) dropped without completion, the type will never finish.",
                self.name, self.resource_type
            );
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::registry::Batch;

    struct Dummy(String);

    impl Resource for Dummy {
        fn name(&self) -> &str {
            &self.0
        }
    }

    fn testbed(policy: CompletionPolicy) -> (Arc<RwLock<Registry>>, Tracker) {
        let registry = Arc::new(RwLock::new(Registry::new()));
        let tracker = Tracker::new(registry.clone(), policy, false);
        (registry, tracker)
    }

    fn counter() -> (Arc<AtomicUsize>, Callback) {
        let hits = Arc::new(AtomicUsize::new(0));
        let h2 = hits.clone();
        (hits, Box::new(move || { h2.fetch_add(1, Ordering::SeqCst); }))
    }

    #[test]
    fn lookup() {
        let (registry, tracker) = testbed(CompletionPolicy::Recheck);
        assert!(match tracker.get_item("imgs", "a") {
            Lookup::Unknown => true,
            _ => false,
        });

        registry
            .write()
            .unwrap()
            .add("imgs", Batch::new().with("a", "a.png").with("b", "b.png"));

        assert!(match tracker.get_item("imgs", "a") {
            Lookup::NotFound => true,
            _ => false,
        });

        tracker.on_item_complete("imgs", "a", Arc::new(Dummy("a".into())));
        assert_eq!(tracker.get_item("imgs", "a").handle().unwrap().name(), "a");
        assert!(!tracker.get_item("imgs", "b").is_found());
        assert_eq!(tracker.type_state("imgs"), TypeState::Pending);
    }

    #[test]
    fn recheck_fires_on_last_completion() {
        let (registry, tracker) = testbed(CompletionPolicy::Recheck);
        registry
            .write()
            .unwrap()
            .add("imgs", Batch::new().with("a", "a.png").with("b", "b.png"));

        let (hits, cb) = counter();
        tracker.on_item_complete("imgs", "a", Arc::new(Dummy("a".into())));
        tracker.check_and_fire(Some(cb));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(tracker.signal(), Signal::Pending);

        tracker.on_item_complete("imgs", "b", Arc::new(Dummy("b".into())));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.signal(), Signal::Fired);
        assert_eq!(tracker.type_state("imgs"), TypeState::Satisfied);

        // Repeated completions and checks after firing are no-ops.
        tracker.on_item_complete("imgs", "b", Arc::new(Dummy("b".into())));
        tracker.check_and_fire(None);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.armed(), 0);
    }

    #[test]
    fn disarm() {
        let (registry, tracker) = testbed(CompletionPolicy::Recheck);
        registry
            .write()
            .unwrap()
            .add("imgs", Batch::new().with("a", "a.png"));

        let (hits, cb) = counter();
        let id = tracker.check_and_fire(Some(cb)).unwrap();
        let (h2, cb2) = counter();
        assert!(tracker.check_and_fire(Some(cb2)).is_some());
        assert_eq!(tracker.armed(), 2);

        assert!(tracker.disarm(id));
        assert!(!tracker.disarm(id));
        assert_eq!(tracker.armed(), 1);

        tracker.on_item_complete("imgs", "a", Arc::new(Dummy("a".into())));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(h2.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.armed(), 0);

        // Fires right away, so nothing stays armed.
        let (_, cb3) = counter();
        assert!(tracker.check_and_fire(Some(cb3)).is_none());
    }

    #[test]
    fn single_check_drops_pending_callbacks() {
        let (registry, tracker) = testbed(CompletionPolicy::SingleCheck);
        registry
            .write()
            .unwrap()
            .add("imgs", Batch::new().with("a", "a.png").with("b", "b.png"));

        let (hits, cb) = counter();
        tracker.on_item_complete("imgs", "a", Arc::new(Dummy("a".into())));
        tracker.check_and_fire(Some(cb));
        tracker.on_item_complete("imgs", "b", Arc::new(Dummy("b".into())));

        assert!(tracker.is_complete());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(tracker.signal(), Signal::Pending);
    }

    #[test]
    fn empty_registry() {
        let registry = Arc::new(RwLock::new(Registry::new()));

        let tracker = Tracker::new(registry.clone(), CompletionPolicy::Recheck, false);
        let (hits, cb) = counter();
        tracker.check_and_fire(Some(cb));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(!tracker.is_complete());

        let tracker = Tracker::new(registry, CompletionPolicy::Recheck, true);
        let (hits, cb) = counter();
        tracker.check_and_fire(Some(cb));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn every_type_must_be_satisfied() {
        let (registry, tracker) = testbed(CompletionPolicy::Recheck);
        {
            let mut registry = registry.write().unwrap();
            registry.add("imgs", Batch::new().with("a", "a.png"));
            registry.add("snds", Batch::new().with("a", "a.ogg"));
        }

        let (hits, cb) = counter();
        tracker.check_and_fire(Some(cb));
        tracker.on_item_complete("imgs", "a", Arc::new(Dummy("a".into())));
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        tracker.on_item_complete("snds", "a", Arc::new(Dummy("a".into())));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failures_never_complete() {
        let (registry, tracker) = testbed(CompletionPolicy::Recheck);
        registry
            .write()
            .unwrap()
            .add("imgs", Batch::new().with("a", "a.png"));

        let tracker = Arc::new(tracker);
        Completion::new(tracker.clone(), "imgs", "a").fail(failure::err_msg("broken"));

        assert!(!tracker.is_complete());
        assert_eq!(
            tracker.failures("imgs"),
            vec![("a".to_owned(), "broken".to_owned())]
        );
        assert!(tracker.failures("snds").is_empty());
    }
}
