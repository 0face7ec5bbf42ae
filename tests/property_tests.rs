use lrucache::listener::RemovalCause;
use lrucache::{Cache, CacheBuilder};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

const CAPACITY: u64 = 16;

#[derive(Clone, Debug)]
enum Op {
    Put(u8, u32, u64),
    Get(u8),
    Remove(u8),
    Ensure(u8, u32, u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..24, any::<u32>(), 0u64..6).prop_map(|(k, v, s)| Op::Put(k, v, s)),
        3 => (0u8..24).prop_map(Op::Get),
        1 => (0u8..24).prop_map(Op::Remove),
        2 => (0u8..24, any::<u32>(), 0u64..6).prop_map(|(k, v, s)| Op::Ensure(k, v, s)),
    ]
}

/// Reference LRU: a vector ordered most-recently-used first.
#[derive(Default)]
struct Model {
    entries: Vec<(u8, u32, u64)>,
    removed: usize,
}

impl Model {
    fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.2).sum()
    }

    fn get(&mut self, key: u8) -> Option<u32> {
        let pos = self.entries.iter().position(|e| e.0 == key)?;
        let entry = self.entries.remove(pos);
        self.entries.insert(0, entry);
        Some(entry.1)
    }

    fn put(&mut self, key: u8, value: u32, size: u64) -> Option<u32> {
        let pos = self.entries.iter().position(|e| e.0 == key);
        let old = pos.map(|pos| self.entries.remove(pos).1);
        if old.is_some() {
            self.removed += 1;
        }
        self.entries.insert(0, (key, value, size));
        while self.total() > CAPACITY && self.entries.len() > 1 {
            self.entries.pop();
            self.removed += 1;
        }
        old
    }

    fn remove(&mut self, key: u8) -> Option<u32> {
        let pos = self.entries.iter().position(|e| e.0 == key)?;
        self.removed += 1;
        Some(self.entries.remove(pos).1)
    }
}

fn counting_cache() -> (Cache<u8, u32>, Arc<Mutex<Vec<RemovalCause>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let events2 = Arc::clone(&events);
    let cache = CacheBuilder::new(CAPACITY)
        .removal_listener(move |_k: &u8, _old, _new, cause| events2.lock().unwrap().push(cause))
        .build();
    (cache, events)
}

proptest! {
    #[test]
    fn behaves_like_reference_lru(ops in prop::collection::vec(op_strategy(), 1..200)) {
        let (cache, events) = counting_cache();
        let mut model = Model::default();

        for op in ops {
            match op {
                Op::Put(k, v, s) => {
                    let got = cache.put_size(k, v, s).map(|v| *v);
                    prop_assert_eq!(got, model.put(k, v, s));
                }
                Op::Get(k) => {
                    prop_assert_eq!(cache.get(&k).map(|v| *v), model.get(k));
                }
                Op::Remove(k) => {
                    prop_assert_eq!(cache.remove(&k).map(|v| *v), model.remove(k));
                }
                Op::Ensure(k, v, s) => {
                    let expected = match model.get(k) {
                        Some(hit) => hit,
                        None => {
                            model.put(k, v, s);
                            v
                        }
                    };
                    prop_assert_eq!(*cache.get_ensure(&k, |_| (v, s)), expected);
                }
            }

            prop_assert_eq!(cache.size(), model.total());
            prop_assert_eq!(cache.entry_count(), model.entries.len());
            prop_assert!(cache.size() <= CAPACITY || cache.entry_count() == 1);
            prop_assert_eq!(events.lock().unwrap().len(), model.removed);
        }

        for (k, v, _) in model.entries.clone() {
            prop_assert_eq!(cache.peek(&k).map(|v| *v), Some(v));
        }
    }

    #[test]
    fn size_stays_bounded(puts in prop::collection::vec((0u16..500, 1u64..8), 1..300)) {
        let cache: Cache<u16, u16> = Cache::new(CAPACITY);
        for (k, s) in puts {
            cache.put_size(k, k, s);
            prop_assert!(cache.size() <= CAPACITY);
        }
    }

    #[test]
    fn remove_decreases_size(
        inserts in prop::collection::vec((0u8..50, 0u64..4), 1..40),
        removes in prop::collection::vec(0u8..50, 1..20),
    ) {
        let cache: Cache<u8, u8> = Cache::new(1_000);
        for (k, s) in inserts {
            cache.put_size(k, k, s);
        }
        for k in removes {
            let before = cache.size();
            let removed = cache.remove(&k);
            prop_assert!(cache.size() <= before);
            prop_assert!(removed.is_none() || !cache.contains(&k));
        }
    }
}
