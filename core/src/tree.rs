//! Folding flat parent/child records into trees.
//!
//! Pure and O(n): one pass indexes records by id, one pass links each record
//! to its parent, and the tree is built bottom-up without recursion so deep
//! chains cannot exhaust the stack. Roots and children keep the relative
//! order of the input; nothing is re-sorted.

use core::hash::Hash;

use hashbrown::HashMap;

/// A record with its ordered children.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TreeNode<T> {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub record: T,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
    pub fn new(record: T) -> Self {
        Self {
            record,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Records of this subtree in preorder
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { stack: vec![self] }
    }

    /// Number of nodes in this subtree
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Levels in this subtree; a leaf has depth 1
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.iter().map(|child| (child, depth + 1)));
        }
        deepest
    }

    /// Consumes the subtree into its records in preorder
    pub fn into_flat(self) -> Vec<T> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(TreeNode { record, children }) = stack.pop() {
            out.push(record);
            stack.extend(children.into_iter().rev());
        }
        out
    }
}

/// Preorder iterator over the records of a subtree.
pub struct Iter<'a, T> {
    stack: Vec<&'a TreeNode<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(&node.record)
    }
}

/// Consumes a forest into its records in preorder
pub fn flatten<T>(forest: Vec<TreeNode<T>>) -> Vec<T> {
    forest.into_iter().flat_map(TreeNode::into_flat).collect()
}

/// Builds a forest of [`TreeNode`]s.
///
/// A record whose `parent_of` is `None`, or names an id not in `records`,
/// is a root.
///
/// When several records share an id, children naming that id attach to the
/// first of them. The later ones are never parents, but each still sits in
/// the forest under its own parent (or as a root) with no children.
pub fn build_tree<T, K, I, P>(records: Vec<T>, id_of: I, parent_of: P) -> Vec<TreeNode<T>>
where
    K: Eq + Hash,
    I: Fn(&T) -> K,
    P: Fn(&T) -> Option<K>,
{
    fold(records, id_of, parent_of, |record, children| TreeNode { record, children })
}

/// Builds a forest out of records that own their children list.
///
/// `set_children` receives each record with its already-assembled children.
pub fn assemble<T, K, I, P, S>(
    records: Vec<T>,
    id_of: I,
    parent_of: P,
    mut set_children: S,
) -> Vec<T>
where
    K: Eq + Hash,
    I: Fn(&T) -> K,
    P: Fn(&T) -> Option<K>,
    S: FnMut(&mut T, Vec<T>),
{
    fold(records, id_of, parent_of, |mut record, children| {
        set_children(&mut record, children);
        record
    })
}

fn fold<T, K, N, I, P, F>(records: Vec<T>, id_of: I, parent_of: P, mut make: F) -> Vec<N>
where
    K: Eq + Hash,
    I: Fn(&T) -> K,
    P: Fn(&T) -> Option<K>,
    F: FnMut(T, Vec<N>) -> N,
{
    crate::canopy_profile_function!();
    let count = records.len();
    if count == 0 {
        return Vec::new();
    }

    let mut index: HashMap<K, usize> = HashMap::with_capacity(count);
    for (position, record) in records.iter().enumerate() {
        index.entry(id_of(record)).or_insert(position);
    }

    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (position, record) in records.iter().enumerate() {
        match parent_of(record).and_then(|parent| index.get(&parent).copied()) {
            Some(parent) => children[parent].push(position),
            None => roots.push(position),
        }
    }
    drop(index);

    // Preorder from the roots; reversed, every node comes after its subtree.
    let mut order = Vec::with_capacity(count);
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(position) = stack.pop() {
        order.push(position);
        stack.extend(children[position].iter().rev());
    }

    let unreachable = count - order.len();
    if unreachable > 0 {
        canopy_warn!(
            dropped = unreachable,
            "records on a parent cycle are unreachable from any root and were left out"
        );
    }

    let mut slots: Vec<Option<T>> = records.into_iter().map(Some).collect();
    let mut built: Vec<Option<N>> = (0..count).map(|_| None).collect();
    for &position in order.iter().rev() {
        let Some(record) = slots[position].take() else {
            continue;
        };
        let kids = children[position]
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        built[position] = Some(make(record, kids));
    }

    roots
        .into_iter()
        .filter_map(|root| built[root].take())
        .collect()
}
