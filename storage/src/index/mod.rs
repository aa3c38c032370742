//! An in-memory ordered index for mapping keys to values.
//!
//! [Index] is a self-balancing binary search tree (AVL tree). After every insertion or removal,
//! each node on the path back to the root recomputes its cached height and, if the heights of its
//! subtrees differ by more than one, restores balance with one or two rotations. The height of the
//! tree therefore stays logarithmic in the number of keys.
//!
//! Each node exclusively owns its children, so rotations move ownership of subtrees rather than
//! rewiring pointers.
//!
//! # Example
//!
//! ```rust
//! use avldb_storage::index::Index;
//!
//! let mut index = Index::new();
//! for key in 1..=7u64 {
//!     index.insert(key, key * 10);
//! }
//! assert_eq!(index.get(&3), Some(&30));
//! assert_eq!(index.root(), Some(&4));
//! assert_eq!(index.height(), 3);
//!
//! index.remove(&3);
//! assert_eq!(index.get(&3), None);
//! ```

mod storage;
pub use storage::{Index, Iter};

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_macros::test_traced;
    use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
    use std::collections::BTreeMap;
    use test_case::test_case;

    #[test_traced]
    fn test_index_basic() {
        let mut index = Index::new();
        assert!(index.is_empty());
        assert_eq!(index.height(), 0);
        assert_eq!(index.root(), None);
        assert_eq!(index.first(), None);

        // Insert a few keys
        assert_eq!(index.insert(2, "b"), None);
        assert_eq!(index.insert(1, "a"), None);
        assert_eq!(index.insert(3, "c"), None);
        assert_eq!(index.len(), 3);
        assert_eq!(index.height(), 2);
        assert_eq!(index.root(), Some(&2));
        index.check();

        // Lookups
        assert_eq!(index.get(&1), Some(&"a"));
        assert_eq!(index.get(&3), Some(&"c"));
        assert_eq!(index.get(&4), None);
        assert!(index.contains_key(&2));
        assert_eq!(index.first(), Some((&1, &"a")));

        // Remove
        assert_eq!(index.remove(&2), Some("b"));
        assert_eq!(index.get(&2), None);
        assert_eq!(index.len(), 2);
        index.check();
    }

    #[test_traced]
    fn test_index_ascending_insert() {
        let mut index = Index::new();
        for key in 1..=7 {
            index.insert(key, key);
            index.check();
        }
        assert_eq!(index.root(), Some(&4));
        assert_eq!(index.height(), 3);
    }

    #[test_traced]
    fn test_index_descending_insert() {
        let mut index = Index::new();
        for key in (1..=1023).rev() {
            index.insert(key, ());
            index.check();
        }
        assert_eq!(index.len(), 1023);
        assert_eq!(index.height(), 10);
    }

    // Each sequence triggers exactly one of the four insertion rotations at the root.
    #[test_case(&[3, 2, 1]; "left left")]
    #[test_case(&[1, 2, 3]; "right right")]
    #[test_case(&[3, 1, 2]; "left right")]
    #[test_case(&[1, 3, 2]; "right left")]
    fn test_index_insert_rotations(keys: &[u32]) {
        let mut index = Index::new();
        for key in keys {
            index.insert(*key, ());
        }
        index.check();
        assert_eq!(index.root(), Some(&2));
        assert_eq!(index.height(), 2);
        assert_eq!(index.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    // Each sequence leaves the root out of balance after the final removal.
    #[test_case(&[2, 1, 3, 0], 3, 1; "left left")]
    #[test_case(&[1, 0, 2, 3], 0, 2; "right right")]
    #[test_case(&[2, 0, 3, 1], 3, 1; "left right")]
    #[test_case(&[1, 0, 3, 2], 0, 2; "right left")]
    fn test_index_remove_rotations(keys: &[u32], removed: u32, root: u32) {
        let mut index = Index::new();
        for key in keys {
            index.insert(*key, ());
        }
        index.check();
        index.remove(&removed);
        index.check();
        assert_eq!(index.root(), Some(&root));
        assert_eq!(index.height(), 2);
    }

    #[test_traced]
    fn test_index_overwrite_keeps_shape() {
        let mut index = Index::new();
        for key in [50, 20, 80, 10, 30, 70, 90, 25] {
            index.insert(key, key.to_string());
        }
        let before = index
            .shape()
            .into_iter()
            .map(|(k, h, b)| (*k, h, b))
            .collect::<Vec<_>>();

        // Overwrite a leaf, an inner node, and the root
        assert_eq!(index.insert(25, "x".to_string()), Some("25".to_string()));
        assert_eq!(index.insert(20, "y".to_string()), Some("20".to_string()));
        assert_eq!(index.insert(50, "z".to_string()), Some("50".to_string()));

        let after = index
            .shape()
            .into_iter()
            .map(|(k, h, b)| (*k, h, b))
            .collect::<Vec<_>>();
        assert_eq!(before, after);
        assert_eq!(index.len(), 8);
        assert_eq!(index.get(&25).map(String::as_str), Some("x"));
        assert_eq!(index.get(&20).map(String::as_str), Some("y"));
        assert_eq!(index.get(&50).map(String::as_str), Some("z"));
    }

    #[test_traced]
    fn test_index_remove_cases() {
        let mut index = Index::new();
        for key in [50, 20, 80, 10, 30, 70, 90, 25] {
            index.insert(key, key * 2);
        }
        index.check();

        // Leaf
        assert_eq!(index.remove(&90), Some(180));
        index.check();

        // Single child
        assert_eq!(index.remove(&30), Some(60));
        index.check();
        assert_eq!(index.get(&25), Some(&50));

        // Two children (root)
        let root = *index.root().unwrap();
        let value = root * 2;
        assert_eq!(index.remove(&root), Some(value));
        index.check();
        assert_eq!(index.get(&root), None);

        // Absent keys are a no-op
        let len = index.len();
        assert_eq!(index.remove(&1000), None);
        assert_eq!(index.remove(&root), None);
        assert_eq!(index.len(), len);
        index.check();

        // Drain
        let keys = index.iter().map(|(k, _)| *k).collect::<Vec<_>>();
        for key in keys {
            assert!(index.remove(&key).is_some());
            index.check();
        }
        assert!(index.is_empty());
        assert_eq!(index.height(), 0);
    }

    #[test_traced]
    fn test_index_in_order_iteration() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut keys = (0..1_000u64).collect::<Vec<_>>();
        keys.shuffle(&mut rng);

        let mut index = Index::new();
        for key in &keys {
            index.insert(*key, ());
        }
        let iterated = index.iter().map(|(k, _)| *k).collect::<Vec<_>>();
        assert!(iterated.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(iterated.len(), keys.len());
        assert_eq!((&index).into_iter().count(), keys.len());
    }

    #[test_traced]
    fn test_index_string_keys() {
        let mut index = Index::new();
        for name in ["delta", "alpha", "echo", "charlie", "bravo"] {
            index.insert(name.to_string(), name.len());
        }
        index.check();
        assert_eq!(index.get(&"charlie".to_string()), Some(&7));
        assert_eq!(index.first().map(|(k, _)| k.as_str()), Some("alpha"));
        assert_eq!(index.remove(&"alpha".to_string()), Some(5));
        assert_eq!(index.first().map(|(k, _)| k.as_str()), Some("bravo"));
        index.check();
    }

    #[test_traced]
    fn test_index_random_operations() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut index = Index::new();
        let mut expected = BTreeMap::new();
        for step in 0..5_000u64 {
            let key = rng.gen_range(0..500u64);
            if rng.gen_bool(0.6) {
                assert_eq!(index.insert(key, step), expected.insert(key, step));
            } else {
                assert_eq!(index.remove(&key), expected.remove(&key));
                assert_eq!(index.get(&key), None);
            }
            index.check();
            assert_eq!(index.len(), expected.len());
        }

        // Every surviving key holds its last inserted value
        for (key, value) in &expected {
            assert_eq!(index.get(key), Some(value));
        }
        assert!(index.iter().eq(expected.iter()));

        // Height stays within the AVL bound (1.44 * log2(n + 2))
        let bound = (1.45 * ((expected.len() + 2) as f64).log2()).ceil() as usize;
        assert!(index.height() <= bound);
    }
}
