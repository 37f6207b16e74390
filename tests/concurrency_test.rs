//! Concurrent mutation of shared atoms

use std::sync::{Arc, Barrier};
use std::thread;

use atomtree::{find_all_by_type, Atom, PreOrder};

#[ctor::ctor]
fn init() {
    atomtree::util::testing::init_test_setup();
}

const THREADS: usize = 8;
const ITERATIONS: usize = 200;

#[test]
fn given_shared_atom_when_mutated_from_many_threads_then_no_update_lost() {
    let atom = Atom::with_id("hub", "hub");

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let atom = Arc::clone(&atom);
            thread::spawn(move || {
                for i in 0..ITERATIONS {
                    let key = format!("t{t}-{i}");
                    atom.set(key.clone(), i.to_string());
                    assert_eq!(atom.get(&key), i.to_string());
                    atom.child_add(Atom::with_id("item", key));
                    let _ = atom.children_get();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    assert_eq!(atom.properties_len(), THREADS * ITERATIONS);
    assert_eq!(atom.children_length(), THREADS * ITERATIONS);
}

#[test]
fn given_readers_and_writers_when_racing_then_each_read_is_consistent() {
    let root = Atom::with_id("root", "root");
    for i in 0..10 {
        root.child_add(Atom::with_id("seed", format!("s{i}")));
    }

    let writers: Vec<_> = (0..4)
        .map(|t| {
            let root = Arc::clone(&root);
            thread::spawn(move || {
                for i in 0..ITERATIONS {
                    root.child_add(Atom::with_id("item", format!("w{t}-{i}")));
                    root.set("last", format!("{t}-{i}"));
                }
            })
        })
        .collect();
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let root = Arc::clone(&root);
            thread::spawn(move || {
                for _ in 0..ITERATIONS {
                    let seen = root.children_get().len();
                    assert!(seen >= 10);
                    assert!(find_all_by_type(&root, "seed").len() == 10);
                    let _ = root.to_json().expect("encode while mutating");
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().expect("worker panicked");
    }
    assert_eq!(PreOrder::new(&root).count(), 1 + 10 + 4 * ITERATIONS);
}

#[test]
fn given_duplicate_ids_when_two_threads_delete_at_once_then_both_are_removed() {
    for _ in 0..2_000 {
        let parent = Atom::with_id("parent", "p");
        parent.children_add([
            Atom::with_id("a", "dup"),
            Atom::with_id("b", "dup"),
            Atom::with_id("c", "keep"),
        ]);
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let parent = Arc::clone(&parent);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    parent.child_delete_by_id("dup");
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker panicked");
        }

        let left: Vec<String> = parent.children_get().iter().map(|c| c.get_id()).collect();
        assert_eq!(left, vec!["keep"]);
    }
}

#[test]
fn given_deletes_racing_adds_when_finished_then_child_count_is_exact() {
    const DUPS: usize = 400;
    let parent = Atom::with_id("parent", "p");
    parent.children_add((0..DUPS).map(|i| {
        let id = if i % 2 == 0 { "dup" } else { "twin" };
        Atom::with_id("old", id)
    }));

    let deleters: Vec<_> = ["dup", "twin"]
        .into_iter()
        .flat_map(|id| (0..2).map(move |_| id))
        .map(|id| {
            let parent = Arc::clone(&parent);
            thread::spawn(move || {
                for _ in 0..DUPS / 4 {
                    parent.child_delete_by_id(id);
                }
            })
        })
        .collect();
    let adders: Vec<_> = (0..4)
        .map(|t| {
            let parent = Arc::clone(&parent);
            thread::spawn(move || {
                for i in 0..ITERATIONS {
                    parent.child_add(Atom::with_id("new", format!("n{t}-{i}")));
                }
            })
        })
        .collect();

    for handle in deleters.into_iter().chain(adders) {
        handle.join().expect("worker panicked");
    }

    assert_eq!(parent.children_length(), 4 * ITERATIONS);
    assert!(parent.child_find_by_id("dup").is_none());
    assert!(parent.child_find_by_id("twin").is_none());
    assert_eq!(parent.children_find_by_type("new").len(), 4 * ITERATIONS);
}

#[test]
fn given_children_set_racing_adds_when_finished_then_no_partial_list_is_seen() {
    let parent = Atom::with_id("parent", "p");
    let replacement: Vec<_> = (0..10).map(|i| Atom::with_id("set", i.to_string())).collect();

    let setters: Vec<_> = (0..2)
        .map(|_| {
            let parent = Arc::clone(&parent);
            let replacement = replacement.clone();
            thread::spawn(move || {
                for _ in 0..ITERATIONS {
                    parent.children_set(replacement.iter().cloned());
                }
            })
        })
        .collect();
    let adders: Vec<_> = (0..2)
        .map(|t| {
            let parent = Arc::clone(&parent);
            thread::spawn(move || {
                for i in 0..ITERATIONS {
                    parent.child_add(Atom::with_id("new", format!("n{t}-{i}")));
                    let seen = parent.children_find_by_type("set").len();
                    assert!(seen == 0 || seen == 10, "partial replacement: {seen}");
                }
            })
        })
        .collect();

    for handle in setters.into_iter().chain(adders) {
        handle.join().expect("worker panicked");
    }

    assert_eq!(parent.children_find_by_type("set").len(), 10);
}
