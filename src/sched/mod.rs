//! A tiny worker pool which runs fetch jobs off the caller's thread.

pub mod latch;

mod scheduler;
mod unwind;

pub mod prelude {
    pub use super::latch::{Latch, LockLatch, SpinLatch};
    pub use super::{PanicHandler, ScheduleSystem, ScheduleSystemShared};
}

pub use self::scheduler::PanicHandler;

use std::sync::Arc;

use self::scheduler::Scheduler;

pub struct ScheduleSystem {
    shared: Arc<ScheduleSystemShared>,
}

impl ScheduleSystem {
    /// Creates a new worker pool with `num` threads. Jobs are executed inline
    /// on the spawning thread if `num` is zero.
    pub fn new(
        num: u32,
        stack_size: Option<usize>,
        panic_handler: Option<Box<PanicHandler>>,
    ) -> Self {
        let scheduler = if num > 0 {
            Some(Scheduler::new(num, stack_size, panic_handler))
        } else {
            None
        };

        ScheduleSystem {
            shared: Arc::new(ScheduleSystemShared { scheduler }),
        }
    }

    /// Creates a scheduler without any worker thread.
    pub fn headless() -> Self {
        ScheduleSystem::new(0, None, None)
    }

    pub fn shared(&self) -> Arc<ScheduleSystemShared> {
        self.shared.clone()
    }

    /// Blocks current thread until all the workers finished their jobs gracefully.
    #[inline]
    pub fn terminate(&self) {
        if let Some(ref scheduler) = self.shared.scheduler {
            scheduler.terminate();
        }
    }
}

impl Drop for ScheduleSystem {
    fn drop(&mut self) {
        self.terminate();
    }
}

pub struct ScheduleSystemShared {
    scheduler: Option<Arc<Scheduler>>,
}

impl ScheduleSystemShared {
    /// Returns true if jobs are executed inline.
    #[inline]
    pub fn is_headless(&self) -> bool {
        self.scheduler.as_ref().map(|v| v.len() == 0).unwrap_or(true)
    }

    /// Spawn an asynchronous job.
    pub fn spawn<F>(&self, func: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match self.scheduler {
            Some(ref scheduler) if scheduler.len() > 0 => scheduler.inject(Box::new(func)),
            _ => func(),
        }
    }
}
