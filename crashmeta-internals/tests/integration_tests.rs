//! Integration tests for [`StripedMap`] under concurrent access.

use std::{
    collections::BTreeMap,
    sync::{
        Arc, Barrier,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use crashmeta_internals::StripedMap;

#[test]
fn test_concurrent_distinct_keys_lose_no_updates() {
    let map = StripedMap::new();
    let threads = 8;
    let per_thread = 250;

    thread::scope(|scope| {
        for t in 0..threads {
            let map = &map;
            scope.spawn(move || {
                for i in 0..per_thread {
                    map.insert(format!("t{t}-k{i}"), format!("{t}:{i}"));
                }
            });
        }
    });

    assert_eq!(map.len(), threads * per_thread);
    for t in 0..threads {
        for i in 0..per_thread {
            assert_eq!(
                map.get(&format!("t{t}-k{i}")).as_deref(),
                Some(format!("{t}:{i}").as_str())
            );
        }
    }
}

#[test]
fn test_concurrent_overwrites_keep_len_stable() {
    let map = StripedMap::with_shards(2);
    for i in 0..16 {
        map.insert(format!("k{i}"), String::new());
    }

    let barrier = Barrier::new(4);
    thread::scope(|scope| {
        for t in 0..4 {
            let (map, barrier) = (&map, &barrier);
            scope.spawn(move || {
                barrier.wait();
                for round in 0..100 {
                    for i in 0..16 {
                        map.insert(format!("k{i}"), format!("{t}/{round}"));
                    }
                }
            });
        }
    });

    assert_eq!(map.len(), 16);
    assert_eq!(map.snapshot().len(), 16);
}

#[test]
fn test_readers_never_observe_torn_entries() {
    let map = Arc::new(StripedMap::new());
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let map = Arc::clone(&map);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for i in 0..2_000 {
                let n = i % 32;
                map.insert(format!("key-{n}"), format!("value-{n}"));
            }
            done.store(true, Ordering::Release);
        })
    };

    while !done.load(Ordering::Acquire) {
        map.for_each(|key, value| {
            assert_eq!(key.strip_prefix("key-"), value.strip_prefix("value-"));
        });
    }
    writer.join().expect("writer thread panicked");

    let entries: BTreeMap<_, _> = map.snapshot().into_iter().collect();
    assert_eq!(entries.len(), 32);
}

#[test]
fn test_debug_lists_entries() {
    let map = StripedMap::with_shards(1);
    map.insert("user".to_owned(), "42".to_owned());
    assert_eq!(format!("{map:?}"), r#"{"user": "42"}"#);
}
