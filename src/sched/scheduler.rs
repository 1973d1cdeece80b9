use std::any::Any;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use crossbeam_deque::{Injector, Steal};

use super::latch::{Latch, SpinLatch};
use super::unwind;

/// The type for a panic handling closure. Note that this same closure
/// may be invoked multiple times in parallel.
pub type PanicHandler = dyn Fn(Box<dyn Any + Send>) + Send + Sync;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct Scheduler {
    injector: Injector<Job>,
    watcher: Watcher,
    terminated: SpinLatch,
    threads: Mutex<Vec<thread::JoinHandle<()>>>,
    panic_handler: Option<Box<PanicHandler>>,
}

impl Scheduler {
    pub fn new(
        num: u32,
        stack_size: Option<usize>,
        panic_handler: Option<Box<PanicHandler>>,
    ) -> Arc<Self> {
        let scheduler = Arc::new(Scheduler {
            injector: Injector::new(),
            watcher: Watcher(Mutex::new(()), Condvar::new()),
            terminated: SpinLatch::new(),
            threads: Mutex::new(Vec::new()),
            panic_handler,
        });

        let mut threads = Vec::with_capacity(num as usize);
        for i in 0..num {
            let sc = scheduler.clone();
            let mut b = thread::Builder::new().name(format!("preload-worker-{}", i));

            if let Some(stack_size) = stack_size {
                b = b.stack_size(stack_size);
            }

            match b.spawn(move || Scheduler::main_loop(&sc)) {
                Ok(handle) => threads.push(handle),
                Err(err) => warn!("[Scheduler] failed to spawn worker {}. {}", i, err),
            }
        }

        *scheduler.threads.lock().unwrap() = threads;
        scheduler
    }

    /// Returns the number of worker threads that are alive.
    #[inline]
    pub fn len(&self) -> usize {
        self.threads.lock().unwrap().len()
    }

    /// Push a job into the "external jobs" queue; it will be taken by whatever
    /// worker has nothing to do.
    pub fn inject(&self, job: Job) {
        self.injector.push(job);
        self.watcher.notify_one();
    }

    pub fn handle_panic(&self, err: Box<dyn Any + Send>) {
        match self.panic_handler {
            Some(ref handler) => handler(err),
            None => warn!("[Scheduler] a job panicked, and the panic has been swallowed."),
        }
    }

    /// Signals workers to exit once the queue drained, and blocks current thread
    /// until all of them finished their jobs gracefully.
    pub fn terminate(&self) {
        if self.terminated.is_set() {
            return;
        }

        self.terminated.set();
        self.watcher.notify_all();

        let threads: Vec<_> = self.threads.lock().unwrap().drain(..).collect();
        for v in threads {
            if v.join().is_err() {
                warn!("[Scheduler] worker exits abnormally.");
            }
        }
    }

    fn main_loop(sc: &Scheduler) {
        loop {
            match sc.injector.steal() {
                Steal::Success(job) => {
                    if let Err(err) = unwind::halt_unwinding(job) {
                        sc.handle_panic(err);
                    }
                }
                Steal::Retry => continue,
                Steal::Empty => {
                    if sc.terminated.is_set() {
                        return;
                    }

                    sc.watcher
                        .wait_while(|| sc.injector.is_empty() && !sc.terminated.is_set());
                }
            }
        }
    }
}

struct Watcher(Mutex<()>, Condvar);

impl Watcher {
    fn wait_while<F: Fn() -> bool>(&self, idle: F) {
        let guard = self.0.lock().unwrap();
        if idle() {
            drop(self.1.wait(guard).unwrap());
        }
    }

    fn notify_one(&self) {
        let _guard = self.0.lock().unwrap();
        self.1.notify_one();
    }

    fn notify_all(&self) {
        let _guard = self.0.lock().unwrap();
        self.1.notify_all();
    }
}
