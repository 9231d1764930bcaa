// tests/registry.rs

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use proptest::prelude::*;
use progload::registry::Registry;

#[test]
fn put_replaces_and_remove_is_idempotent() {
    let registry: Registry<u32> = Registry::new();

    registry.put("a", 1);
    registry.put("a", 2);
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get("a").as_deref(), Some(&2));

    assert!(registry.remove("a"));
    assert!(!registry.remove("a"));
    assert!(!registry.remove("never-added"));
    assert!(registry.is_empty());
}

#[test]
fn clones_share_the_same_map() {
    let registry: Registry<&'static str> = Registry::new();
    let consumer = registry.clone();

    registry.put("a.prog", "v1");
    assert!(consumer.contains("a.prog"));

    registry.remove("a.prog");
    assert!(consumer.snapshot().is_empty());
}

#[test]
fn replaced_program_survives_while_a_reader_holds_it() {
    let registry: Registry<String> = Registry::new();
    registry.put("a", "old".to_string());

    let held = registry.get("a").expect("present");
    registry.put("a", "new".to_string());

    assert_eq!(held.as_str(), "old");
    assert_eq!(registry.get("a").expect("present").as_str(), "new");
}

/// Readers racing a stream of replacements must always see exactly one
/// entry for the name, never zero.
#[test]
fn concurrent_replacement_never_exposes_a_missing_entry() {
    let registry: Registry<usize> = Registry::new();
    registry.put("a.prog", 0);
    let done = AtomicBool::new(false);

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                while !done.load(Ordering::Relaxed) {
                    let snapshot = registry.snapshot();
                    assert_eq!(snapshot.len(), 1);
                    assert!(snapshot.contains_key("a.prog"));
                    assert!(registry.get("a.prog").is_some());
                }
            });
        }

        s.spawn(|| {
            for version in 1..=2_000 {
                registry.put("a.prog", version);
            }
            done.store(true, Ordering::Relaxed);
        });
    });

    assert_eq!(registry.get("a.prog").as_deref(), Some(&2_000));
}

#[derive(Debug, Clone)]
enum Op {
    Put(u8, u32),
    Remove(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..5u8, any::<u32>()).prop_map(|(n, v)| Op::Put(n, v)),
        (0..5u8).prop_map(Op::Remove),
    ]
}

proptest! {
    #[test]
    fn registry_matches_a_plain_map(ops in proptest::collection::vec(op_strategy(), 0..64)) {
        let registry: Registry<u32> = Registry::new();
        let mut model: HashMap<String, u32> = HashMap::new();

        for op in ops {
            match op {
                Op::Put(n, v) => {
                    let name = format!("p{n}.prog");
                    registry.put(name.clone(), v);
                    model.insert(name, v);
                }
                Op::Remove(n) => {
                    let name = format!("p{n}.prog");
                    prop_assert_eq!(registry.remove(&name), model.remove(&name).is_some());
                }
            }
        }

        let mut expected: Vec<String> = model.keys().cloned().collect();
        expected.sort();
        prop_assert_eq!(registry.names(), expected);
        for (name, value) in &model {
            let got = registry.get(name);
            prop_assert_eq!(got.as_deref(), Some(value));
        }
    }
}
