use std::{cmp::Ordering, mem};

/// An owned subtree.
type Link<K, V> = Option<Box<Node<K, V>>>;

/// A single entry of the tree. Each node exclusively owns its children.
struct Node<K, V> {
    key: K,
    value: V,
    height: usize,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            height: 1,
            left: None,
            right: None,
        })
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    fn balance(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }
}

fn height<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

fn balance<K, V>(link: &Link<K, V>) -> isize {
    link.as_ref().map_or(0, |node| node.balance())
}

/// Promote the left child of `root` to the root of the subtree.
fn rotate_right<K, V>(mut root: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = root.left.take() else {
        return root;
    };
    root.left = pivot.right.take();
    root.update_height();
    pivot.right = Some(root);
    pivot.update_height();
    pivot
}

/// Promote the right child of `root` to the root of the subtree.
fn rotate_left<K, V>(mut root: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = root.right.take() else {
        return root;
    };
    root.right = pivot.left.take();
    root.update_height();
    pivot.left = Some(root);
    pivot.update_height();
    pivot
}

/// Restore balance at `node` after an insertion below it.
///
/// `side` is the ordering of the inserted key relative to the key of the child it descended
/// into (captured before descending, as the key is consumed by the insertion). When the node is
/// out of balance no rotation happened below it, so that child is still in place.
fn rebalance_insert<K, V>(mut node: Box<Node<K, V>>, side: Option<Ordering>) -> Box<Node<K, V>> {
    node.update_height();
    let b = node.balance();
    match side {
        Some(Ordering::Less) if b > 1 => rotate_right(node),
        Some(Ordering::Greater) if b < -1 => rotate_left(node),
        Some(Ordering::Greater) if b > 1 => {
            node.left = node.left.take().map(rotate_left);
            rotate_right(node)
        }
        Some(Ordering::Less) if b < -1 => {
            node.right = node.right.take().map(rotate_right);
            rotate_left(node)
        }
        _ => node,
    }
}

/// Restore balance at `node` after a removal below it.
fn rebalance_remove<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    node.update_height();
    let b = node.balance();
    if b > 1 {
        if balance(&node.left) < 0 {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }
    if b < -1 {
        if balance(&node.right) > 0 {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }
    node
}

/// Insert `key` below `link`, returning the new subtree root and the overwritten value (if any).
fn insert<K: Ord, V>(link: Link<K, V>, key: K, value: V) -> (Box<Node<K, V>>, Option<V>) {
    let Some(mut node) = link else {
        return (Node::new(key, value), None);
    };
    match key.cmp(&node.key) {
        Ordering::Equal => {
            let previous = mem::replace(&mut node.value, value);
            (node, Some(previous))
        }
        Ordering::Less => {
            let side = node.left.as_ref().map(|child| key.cmp(&child.key));
            let (child, previous) = insert(node.left.take(), key, value);
            node.left = Some(child);
            if previous.is_some() {
                // Overwrite: the shape is unchanged.
                return (node, previous);
            }
            (rebalance_insert(node, side), None)
        }
        Ordering::Greater => {
            let side = node.right.as_ref().map(|child| key.cmp(&child.key));
            let (child, previous) = insert(node.right.take(), key, value);
            node.right = Some(child);
            if previous.is_some() {
                return (node, previous);
            }
            (rebalance_insert(node, side), None)
        }
    }
}

/// Detach the minimum node of the subtree rooted at `node`, rebalancing on the way up.
///
/// Returns the remaining subtree and the detached key and value.
fn remove_min<K, V>(mut node: Box<Node<K, V>>) -> (Link<K, V>, (K, V)) {
    match node.left.take() {
        None => {
            let Node {
                key, value, right, ..
            } = *node;
            (right, (key, value))
        }
        Some(left) => {
            let (left, min) = remove_min(left);
            node.left = left;
            (Some(rebalance_remove(node)), min)
        }
    }
}

/// Remove `key` from below `link`, returning the new subtree root and the removed value.
fn remove<K: Ord, V>(link: Link<K, V>, key: &K) -> (Link<K, V>, Option<V>) {
    let Some(mut node) = link else {
        return (None, None);
    };
    let removed = match key.cmp(&node.key) {
        Ordering::Less => {
            let (child, removed) = remove(node.left.take(), key);
            node.left = child;
            removed
        }
        Ordering::Greater => {
            let (child, removed) = remove(node.right.take(), key);
            node.right = child;
            removed
        }
        Ordering::Equal => match (node.left.take(), node.right.take()) {
            (None, None) => return (None, Some(node.value)),
            (Some(child), None) | (None, Some(child)) => return (Some(child), Some(node.value)),
            (Some(left), Some(right)) => {
                // Take over the in-order successor, then drop it from the right subtree.
                let (right, (key, value)) = remove_min(right);
                node.left = Some(left);
                node.right = right;
                node.key = key;
                Some(mem::replace(&mut node.value, value))
            }
        },
    };
    if removed.is_none() {
        return (Some(node), None);
    }
    (Some(rebalance_remove(node)), removed)
}

/// An ordered map from keys to values, kept height-balanced (AVL) so that lookups, insertions,
/// and removals take a logarithmic number of comparisons.
pub struct Index<K: Ord, V> {
    root: Link<K, V>,
    len: usize,
}

impl<K: Ord, V> Default for Index<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> Index<K, V> {
    /// Create an empty [Index].
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Number of keys in the index.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree (0 when empty, 1 for a single key).
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    /// Key stored at the root of the tree.
    pub fn root(&self) -> Option<&K> {
        self.root.as_ref().map(|node| &node.key)
    }

    /// Insert `value` under `key`, returning the previous value if `key` was already present.
    ///
    /// Overwriting an existing key leaves the shape of the tree untouched.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (root, previous) = insert(self.root.take(), key, value);
        self.root = Some(root);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Get the value stored under `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.value),
            };
        }
        None
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Remove `key`, returning its value. Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (root, removed) = remove(self.root.take(), key);
        self.root = root;
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// The entry with the smallest key.
    pub fn first(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some((&node.key, &node.value))
    }

    /// Iterate over all entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter { stack: Vec::new() };
        iter.descend(self.root.as_deref());
        iter
    }

    /// Visit every node in pre-order as `(key, height, balance)`.
    #[cfg(test)]
    pub(super) fn shape(&self) -> Vec<(&K, usize, isize)> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<&Node<K, V>> = self.root.as_deref().into_iter().collect();
        while let Some(node) = stack.pop() {
            out.push((&node.key, node.height, node.balance()));
            stack.extend(node.right.as_deref());
            stack.extend(node.left.as_deref());
        }
        out
    }

    /// Verify ordering, balance, and cached heights of every node, panicking on any violation.
    #[cfg(test)]
    pub(super) fn check(&self) {
        fn walk<K: Ord, V>(link: &Link<K, V>, lower: Option<&K>, upper: Option<&K>) -> usize {
            let Some(node) = link else {
                return 0;
            };
            if let Some(lower) = lower {
                assert!(node.key > *lower, "left subtree key out of order");
            }
            if let Some(upper) = upper {
                assert!(node.key < *upper, "right subtree key out of order");
            }
            let left = walk(&node.left, lower, Some(&node.key));
            let right = walk(&node.right, Some(&node.key), upper);
            assert!(left.abs_diff(right) <= 1, "node out of balance");
            assert_eq!(node.height, 1 + left.max(right), "stale height");
            node.height
        }
        walk(&self.root, None, None);
        assert_eq!(self.iter().count(), self.len, "stale length");
    }
}

/// In-order iterator over the entries of an [Index].
pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn descend(&mut self, mut node: Option<&'a Node<K, V>>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.descend(node.right.as_deref());
        Some((&node.key, &node.value))
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a Index<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
