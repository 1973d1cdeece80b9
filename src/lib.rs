//! # What is This?
//!
//! A preloader takes batches of named source locators per resource type, fans out one
//! asynchronous fetch per item, and invokes a single callback exactly once when every
//! queued item across every resource type has finished loading.
//!
//! ```rust,no_run
//! use preload::prelude::*;
//!
//! let preloader = Preloader::new(PreloadParams::default()).unwrap();
//! preloader.add("imgs", Batch::new().with("crate", "assets/crate.png"));
//! preloader.load(|| println!("Everything is ready."));
//! ```
//!
//! # Components
//!
//! The `Registry` holds the queued batches and the expected item count of every type.
//! The `Dispatcher` invokes the `FetchHandler` registered for a type once per queued
//! item. Handlers report back through a one-shot `Completion`, which lands in the
//! `Tracker`. The tracker stores every finished item and fires the armed callbacks once
//! the stored count of every queued type equals its expected count.
//!
//! Images are the only type registered by default (`imgs`). Their bytes are read through
//! pluggable virtual filesystems (`file` by default) and decoded on a small worker pool.
//!
//! # Stalls
//!
//! A type without handler, an item whose fetch failed, or a name queued twice inside a
//! type leave that type pending forever, and the callback never fires. Use
//! `Preloader::wait_until_complete` to bound the wait.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

pub mod dispatch;
pub mod errors;
pub mod images;
pub mod registry;
pub mod res;
pub mod resource;
pub mod sched;
pub mod settings;
pub mod tracker;
pub mod utils;

mod preloader;
pub use self::preloader::Preloader;

pub mod prelude {
    pub use crate::dispatch::FetchHandler;
    pub use crate::errors::{Error, Result};
    pub use crate::images::{Image, IMAGES};
    pub use crate::registry::Batch;
    pub use crate::res::prelude::{Dir, Locator, Memory, Vfs};
    pub use crate::resource::{Resource, ResourceHandle};
    pub use crate::settings::{CompletionPolicy, PreloadParams};
    pub use crate::tracker::{Completion, Lookup};
    pub use crate::Preloader;
}
