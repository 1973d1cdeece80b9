extern crate preload;

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use preload::sched::prelude::*;

#[test]
fn spawn() {
    let sched = ScheduleSystem::new(4, None, None);
    let shared = sched.shared();
    assert!(!shared.is_headless());

    let counter = Arc::new(AtomicUsize::new(0));
    for _ in 0..256 {
        let counter = counter.clone();
        shared.spawn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }

    sched.terminate();
    assert_eq!(counter.load(Ordering::SeqCst), 256);

    // Jobs run inline once workers are gone.
    let c2 = counter.clone();
    shared.spawn(move || {
        c2.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(counter.load(Ordering::SeqCst), 257);
}

#[test]
fn headless() {
    let sched = ScheduleSystem::headless();
    let shared = sched.shared();
    assert!(shared.is_headless());

    let counter = Arc::new(AtomicUsize::new(0));
    let c2 = counter.clone();
    shared.spawn(move || {
        c2.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn panics() {
    let panics = Arc::new(AtomicUsize::new(0));
    let p2 = panics.clone();
    let handler = move |_: Box<dyn Any + Send>| {
        p2.fetch_add(1, Ordering::SeqCst);
    };

    let sched = ScheduleSystem::new(2, None, Some(Box::new(handler)));
    let counter = Arc::new(AtomicUsize::new(0));

    for i in 0..8 {
        let counter = counter.clone();
        sched.shared().spawn(move || {
            if i % 2 == 0 {
                panic!("job {} panics.", i);
            }

            counter.fetch_add(1, Ordering::SeqCst);
        });
    }

    sched.terminate();
    assert_eq!(panics.load(Ordering::SeqCst), 4);
    assert_eq!(counter.load(Ordering::SeqCst), 4);
}
