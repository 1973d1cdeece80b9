//! Source locators and the virtual filesystems behind them.
//!
//! Every item queued for preloading names its source with a locator string like
//! `file:///usr/share/icons/crate.png`, `mem://crate.png` or just `assets/crate.png`.
//! The schema picks a `Vfs` from the `SchemaResolver`, which reads the bytes that a
//! fetch handler decodes afterwards.

pub mod locator;
pub mod vfs;

pub mod prelude {
    pub use super::locator::Locator;
    pub use super::vfs::{Dir, Memory, SchemaResolver, Vfs};
}
