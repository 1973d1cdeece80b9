//! Opaque handles to fetched resources.

use std::any::Any;
use std::sync::Arc;

/// Upcasts to `Any`, implemented for every sized type so that resources don't
/// have to.
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A fetched resource, tagged with the item name it was queued under.
pub trait Resource: AsAny {
    fn name(&self) -> &str;
}

/// The shared handle of a fetched resource. Ownership passes to the caller once
/// it has been handed out; nothing is ever released by the preloader itself.
pub type ResourceHandle = Arc<dyn Resource>;

/// Casts a handle into its concrete resource type.
pub fn downcast<T: Resource>(handle: &ResourceHandle) -> Option<Arc<T>> {
    AsAny::into_any(handle.clone()).downcast::<T>().ok()
}

/// Borrows the concrete resource behind a handle.
pub fn downcast_ref<T: Resource>(handle: &ResourceHandle) -> Option<&T> {
    AsAny::as_any(&**handle).downcast_ref::<T>()
}
