//! A vector with logarithmic-time insertion and removal at arbitrary positions.
//!
//! This is the ordered active structure of the segment intersection sweep. It
//! is a B-tree in which every child pointer is annotated with the number of
//! elements below it, so positions can be found by walking down the tree.

use arrayvec::ArrayVec;

type Children<T, const B: usize> = ArrayVec<(usize, Box<Node<T, B>>), B>;

#[derive(Clone)]
enum Node<T, const B: usize> {
    Leaf(ArrayVec<T, B>),
    Branch(Children<T, B>),
}

// Finds the child containing position `pos`, and the position within that child.
fn locate<T, const B: usize>(children: &Children<T, B>, mut pos: usize) -> Option<(usize, usize)> {
    for (i, (count, _)) in children.iter().enumerate() {
        if pos < *count {
            return Some((i, pos));
        }
        pos -= count;
    }
    None
}

// Like `locate`, but position `pos` may be one-past-the-end of a child.
// `pos` must be in bounds for `children`.
fn locate_insert<T, const B: usize>(children: &Children<T, B>, mut pos: usize) -> (usize, usize) {
    let last = children.len() - 1;
    for (i, (count, _)) in children[..last].iter().enumerate() {
        if pos <= *count {
            return (i, pos);
        }
        pos -= count;
    }
    (last, pos)
}

// Fills `left` with the first half of `all` and returns the second half.
fn split_halves<U, const B: usize>(left: &mut ArrayVec<U, B>, mut all: Vec<U>) -> ArrayVec<U, B> {
    debug_assert!(left.is_empty());
    let right = all.drain(all.len() / 2..).collect();
    left.extend(all);
    right
}

// Moves everything from `right` to the end of `left`. If it doesn't all fit,
// the combined contents are split evenly and the second half is returned.
fn merge_halves<U, const B: usize>(
    left: &mut ArrayVec<U, B>,
    right: ArrayVec<U, B>,
) -> Option<ArrayVec<U, B>> {
    let all: Vec<U> = left.drain(..).chain(right).collect();
    if all.len() <= B {
        left.extend(all);
        None
    } else {
        Some(split_halves(left, all))
    }
}

impl<T, const B: usize> Node<T, B> {
    fn len(&self) -> usize {
        match self {
            Node::Leaf(items) => items.len(),
            Node::Branch(children) => children.iter().map(|(count, _)| count).sum(),
        }
    }

    // The number of direct entries (items or children) of this node.
    fn width(&self) -> usize {
        match self {
            Node::Leaf(items) => items.len(),
            Node::Branch(children) => children.len(),
        }
    }

    fn get(&self, pos: usize) -> Option<&T> {
        match self {
            Node::Leaf(items) => items.get(pos),
            Node::Branch(children) => {
                let (i, pos) = locate(children, pos)?;
                children[i].1.get(pos)
            }
        }
    }

    fn get_mut(&mut self, pos: usize) -> Option<&mut T> {
        match self {
            Node::Leaf(items) => items.get_mut(pos),
            Node::Branch(children) => {
                let (i, pos) = locate(children, pos)?;
                children[i].1.get_mut(pos)
            }
        }
    }

    fn last(&self) -> Option<&T> {
        match self {
            Node::Leaf(items) => items.last(),
            Node::Branch(children) => children.last()?.1.last(),
        }
    }

    // Inserts an item. If this node overflows, it gets split and the new
    // right sibling is returned.
    fn insert(&mut self, pos: usize, item: T) -> Option<Box<Node<T, B>>> {
        match self {
            Node::Leaf(items) => {
                let err = items.try_insert(pos, item).err()?;
                let mut all: Vec<T> = items.drain(..).collect();
                all.insert(pos, err.element());
                Some(Box::new(Node::Leaf(split_halves(items, all))))
            }
            Node::Branch(children) => {
                let (i, pos) = locate_insert(children, pos);
                children[i].0 += 1;
                let sibling = children[i].1.insert(pos, item)?;
                children[i].0 = children[i].1.len();

                let entry = (sibling.len(), sibling);
                let err = children.try_insert(i + 1, entry).err()?;
                let mut all: Vec<_> = children.drain(..).collect();
                all.insert(i + 1, err.element());
                Some(Box::new(Node::Branch(split_halves(children, all))))
            }
        }
    }

    fn remove(&mut self, pos: usize) -> Option<T> {
        match self {
            Node::Leaf(items) => (pos < items.len()).then(|| items.remove(pos)),
            Node::Branch(children) => {
                let (i, pos) = locate(children, pos)?;
                let ret = children[i].1.remove(pos)?;
                children[i].0 -= 1;
                if children[i].1.width() < B / 2 {
                    rebalance(children, i);
                }
                Some(ret)
            }
        }
    }

    // Merges a right sibling into this node, splitting again if necessary.
    fn absorb(&mut self, right: Node<T, B>) -> Option<Box<Node<T, B>>> {
        match (self, right) {
            (Node::Leaf(left), Node::Leaf(right)) => {
                merge_halves(left, right).map(|rest| Box::new(Node::Leaf(rest)))
            }
            (Node::Branch(left), Node::Branch(right)) => {
                merge_halves(left, right).map(|rest| Box::new(Node::Branch(rest)))
            }
            _ => unreachable!("siblings always have the same height"),
        }
    }

    // Returns the height of this subtree.
    fn check_invariants(&self, is_root: bool) -> usize {
        if !is_root {
            assert!(self.width() >= B / 2);
        }
        match self {
            Node::Leaf(_) => 0,
            Node::Branch(children) => {
                assert!(!children.is_empty());
                let heights: Vec<usize> = children
                    .iter()
                    .map(|(count, child)| {
                        assert_eq!(*count, child.len());
                        child.check_invariants(false)
                    })
                    .collect();
                assert!(heights.windows(2).all(|w| w[0] == w[1]));
                heights[0] + 1
            }
        }
    }
}

// The child at index `i` has become too small: merge it with a neighbor.
fn rebalance<T, const B: usize>(children: &mut Children<T, B>, i: usize) {
    if children.len() < 2 {
        return;
    }
    let left = if i + 1 < children.len() { i } else { i - 1 };
    let (_, right) = children.remove(left + 1);
    let rest = children[left].1.absorb(*right);
    children[left].0 = children[left].1.len();
    if let Some(rest) = rest {
        children.insert(left + 1, (rest.len(), rest));
    }
}

/// A sequence supporting insertion, removal, and lookup by position in `O(log n)` time.
///
/// `B` is the branching factor; it must be at least 4.
#[derive(Clone)]
pub struct TreeVec<T, const B: usize> {
    root: Box<Node<T, B>>,
}

impl<T, const B: usize> Default for TreeVec<T, B> {
    fn default() -> Self {
        TreeVec {
            root: Box::new(Node::Leaf(ArrayVec::new())),
        }
    }
}

impl<T: std::fmt::Debug, const B: usize> std::fmt::Debug for TreeVec<T, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, const B: usize> TreeVec<T, B> {
    /// Creates an empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of elements.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Is this vector empty?
    pub fn is_empty(&self) -> bool {
        self.root.width() == 0
    }

    /// The element at position `index`, if there is one.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.root.get(index)
    }

    /// The element at position `index`, if there is one.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.root.get_mut(index)
    }

    /// Inserts an element at position `index`, shifting everything after it.
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, element: T) {
        assert!(index <= self.len(), "insertion index {index} out of bounds");
        if let Some(sibling) = self.root.insert(index, element) {
            let old_root = std::mem::replace(&mut self.root, Box::new(Node::Leaf(ArrayVec::new())));
            let mut children = ArrayVec::new();
            children.push((old_root.len(), old_root));
            children.push((sibling.len(), sibling));
            self.root = Box::new(Node::Branch(children));
        }
    }

    /// Appends an element.
    pub fn push(&mut self, element: T) {
        self.insert(self.len(), element);
    }

    /// Removes and returns the element at position `index`.
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        let Some(ret) = self.root.remove(index) else {
            panic!("removal index {index} out of bounds");
        };

        if let Node::Branch(children) = &mut *self.root {
            if children.len() == 1 {
                if let Some((_, child)) = children.pop() {
                    self.root = child;
                }
            }
        }
        ret
    }

    /// Panics if the tree structure is inconsistent.
    pub fn check_invariants(&self) {
        self.root.check_invariants(true);
    }

    /// Iterates over all the elements.
    pub fn iter(&self) -> Iter<'_, T, B> {
        Iter::new(&self.root, 0, self.len())
    }

    /// Iterates over the elements with positions in `range`.
    ///
    /// Panics if the range extends past the end.
    pub fn range(&self, range: std::ops::Range<usize>) -> Iter<'_, T, B> {
        assert!(range.end <= self.len(), "range end out of bounds");
        Iter::new(&self.root, range.start, range.end)
    }

    /// Assuming that the elements are partitioned by `pred` (all the elements
    /// satisfying it come first), returns the number of elements satisfying it.
    pub fn partition_point<P>(&self, mut pred: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        let mut node = &*self.root;
        let mut base = 0;
        loop {
            match node {
                Node::Leaf(items) => return base + items.partition_point(&mut pred),
                Node::Branch(children) => {
                    // The first child whose last element fails the predicate
                    // contains the partition point.
                    let next = children.iter().find(|(count, child)| {
                        if child.last().is_some_and(&mut pred) {
                            base += count;
                            false
                        } else {
                            true
                        }
                    });
                    match next {
                        Some((_, child)) => node = &**child,
                        None => return base,
                    }
                }
            }
        }
    }
}

impl<T, const B: usize> FromIterator<T> for TreeVec<T, B> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut ret = TreeVec::new();
        for x in iter {
            ret.push(x);
        }
        ret
    }
}

impl<T, const B: usize> std::ops::Index<usize> for TreeVec<T, B> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(x) => x,
            None => panic!("index {index} out of bounds"),
        }
    }
}

impl<'a, T, const B: usize> IntoIterator for &'a TreeVec<T, B> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, B>;

    fn into_iter(self) -> Iter<'a, T, B> {
        self.iter()
    }
}

/// An iterator over (part of) a [`TreeVec`].
pub struct Iter<'a, T, const B: usize> {
    // For each ancestor of the current leaf, the siblings that are still to come.
    stack: Vec<std::slice::Iter<'a, (usize, Box<Node<T, B>>)>>,
    leaf: std::slice::Iter<'a, T>,
    remaining: usize,
}

impl<'a, T, const B: usize> Iter<'a, T, B> {
    fn new(root: &'a Node<T, B>, start: usize, end: usize) -> Self {
        let mut ret = Iter {
            stack: Vec::new(),
            leaf: [].iter(),
            remaining: end.saturating_sub(start),
        };
        let mut node = root;
        let mut pos = start;
        loop {
            match node {
                Node::Leaf(items) => {
                    ret.leaf = items.get(pos..).unwrap_or(&[]).iter();
                    return ret;
                }
                Node::Branch(children) => {
                    let Some((i, child_pos)) = locate(children, pos) else {
                        return ret;
                    };
                    ret.stack.push(children[i + 1..].iter());
                    node = &*children[i].1;
                    pos = child_pos;
                }
            }
        }
    }

    fn descend(&mut self, mut node: &'a Node<T, B>) {
        loop {
            match node {
                Node::Leaf(items) => {
                    self.leaf = items.iter();
                    return;
                }
                Node::Branch(children) => {
                    let mut rest = children.iter();
                    let Some((_, first)) = rest.next() else {
                        return;
                    };
                    self.stack.push(rest);
                    node = &**first;
                }
            }
        }
    }
}

impl<'a, T, const B: usize> Iterator for Iter<'a, T, B> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            if let Some(x) = self.leaf.next() {
                self.remaining -= 1;
                return Some(x);
            }

            let top = self.stack.last_mut()?;
            match top.next() {
                Some((_, child)) => self.descend(child),
                None => {
                    self.stack.pop();
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn insert_get() {
        let mut vec = TreeVec::<i32, 4>::default();
        for x in 0..8 {
            vec.insert(0, x);
            vec.check_invariants();
        }
        assert_eq!(vec.len(), 8);
        assert_eq!(vec[0], 7);
        assert_eq!(vec[7], 0);
        assert_eq!(vec.get(8), None);

        *vec.get_mut(3).unwrap() = 100;
        assert_eq!(
            vec.iter().copied().collect::<Vec<_>>(),
            vec![7, 6, 5, 100, 3, 2, 1, 0]
        );
    }

    #[test]
    fn insert_remove() {
        let mut vec: TreeVec<i32, 4> = (0..20).collect();
        vec.check_invariants();
        assert_eq!(vec.remove(5), 5);
        assert_eq!(vec.remove(0), 0);
        assert_eq!(vec.remove(17), 19);
        vec.check_invariants();
        assert_eq!(
            vec.iter().copied().collect::<Vec<_>>(),
            (1..5).chain(6..19).collect::<Vec<_>>()
        );

        while !vec.is_empty() {
            vec.remove(vec.len() / 2);
            vec.check_invariants();
        }
        assert_eq!(vec.len(), 0);
    }

    #[test]
    fn range() {
        let vec: TreeVec<i32, 4> = (0..50).collect();
        assert_eq!(
            vec.range(17..23).copied().collect::<Vec<_>>(),
            (17..23).collect::<Vec<_>>()
        );
        assert_eq!(vec.range(50..50).count(), 0);
        assert_eq!(vec.range(49..50).copied().collect::<Vec<_>>(), vec![49]);
    }

    #[test]
    fn partition_point() {
        let vec: TreeVec<i32, 4> = (0..50).map(|x| 2 * x).collect();
        assert_eq!(vec.partition_point(|&x| x < 0), 0);
        assert_eq!(vec.partition_point(|&x| x < 31), 16);
        assert_eq!(vec.partition_point(|&x| x <= 32), 17);
        assert_eq!(vec.partition_point(|&x| x < 1000), 50);
        assert_eq!(TreeVec::<i32, 4>::new().partition_point(|_| true), 0);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(usize, i32),
        Remove(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (any::<usize>(), any::<i32>()).prop_map(|(i, x)| Op::Insert(i, x)),
            any::<usize>().prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn matches_vec(ops in prop::collection::vec(op(), 0..200)) {
            let mut vec = Vec::new();
            let mut tree_vec = TreeVec::<i32, 4>::new();
            for op in ops {
                match op {
                    Op::Insert(i, x) => {
                        let i = i % (vec.len() + 1);
                        vec.insert(i, x);
                        tree_vec.insert(i, x);
                    }
                    Op::Remove(i) => {
                        if !vec.is_empty() {
                            let i = i % vec.len();
                            prop_assert_eq!(vec.remove(i), tree_vec.remove(i));
                        }
                    }
                }
                tree_vec.check_invariants();
                prop_assert_eq!(tree_vec.len(), vec.len());
            }
            prop_assert_eq!(tree_vec.iter().copied().collect::<Vec<_>>(), vec);
        }
    }
}
