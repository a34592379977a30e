//! Height-balanced (AVL) index over patient identifiers.
//!
//! Nodes live in a growable arena and refer to their children by position, so rotations only
//! rewrite a few `Option<usize>` links and the tree is dropped as one flat `Vec`.
//!
//! Heights follow the usual convention: a leaf has height 1 and an absent child counts as 0.
//! After every insertion the balance factor `height(left) - height(right)` is within `-1..=1`
//! at every node.

use crate::patient::PatientRecord;
use registry_types::PatientId;
use std::cmp::Ordering;

#[derive(Debug)]
struct Node {
    record: PatientRecord,
    height: u32,
    left: Option<usize>,
    right: Option<usize>,
}

impl Node {
    fn leaf(record: PatientRecord) -> Self {
        Self {
            record,
            height: 1,
            left: None,
            right: None,
        }
    }
}

/// Result of [`SortedIndex::insert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexInsert {
    /// A new node was added and the tree rebalanced.
    Added,
    /// The identifier was already present; its record was replaced in place.
    Replaced,
}

#[derive(Debug, Default)]
pub struct SortedIndex {
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl SortedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Height of the whole tree; 0 when empty.
    pub fn height(&self) -> u32 {
        self.height_of(self.root)
    }

    /// Inserts `record` by identifier and rebalances on the way back to the root.
    ///
    /// An identifier that is already indexed keeps its node (so the shape does not change)
    /// but carries the new record from then on.
    pub fn insert(&mut self, record: PatientRecord) -> IndexInsert {
        let mut outcome = IndexInsert::Added;
        let root = self.insert_at(self.root, record, &mut outcome);
        self.root = Some(root);
        outcome
    }

    /// Lazy in-order traversal in strictly ascending identifier order.
    ///
    /// Each call starts a fresh traversal.
    pub fn export_ordered(&self) -> InOrder<'_> {
        let mut iter = InOrder {
            nodes: &self.nodes,
            stack: Vec::with_capacity(self.height() as usize),
        };
        iter.push_left_spine(self.root);
        iter
    }

    fn insert_at(
        &mut self,
        node: Option<usize>,
        record: PatientRecord,
        outcome: &mut IndexInsert,
    ) -> usize {
        let Some(idx) = node else {
            self.nodes.push(Node::leaf(record));
            return self.nodes.len() - 1;
        };

        let key = record.id();
        match key.cmp(&self.nodes[idx].record.id()) {
            Ordering::Less => {
                let child = self.insert_at(self.nodes[idx].left, record, outcome);
                self.nodes[idx].left = Some(child);
            }
            Ordering::Greater => {
                let child = self.insert_at(self.nodes[idx].right, record, outcome);
                self.nodes[idx].right = Some(child);
            }
            Ordering::Equal => {
                self.nodes[idx].record = record;
                *outcome = IndexInsert::Replaced;
                return idx;
            }
        }

        self.update_height(idx);
        self.rebalance(idx, key)
    }

    /// Restores the AVL property at `idx` after `key` was inserted below it.
    fn rebalance(&mut self, idx: usize, key: PatientId) -> usize {
        let balance = self.balance_factor(idx);

        if balance > 1 {
            if let Some(left) = self.nodes[idx].left {
                // Left-Right: straighten into Left-Left first.
                if key > self.nodes[left].record.id() {
                    let pivot = self.rotate_left(left);
                    self.nodes[idx].left = Some(pivot);
                }
                return self.rotate_right(idx);
            }
        }

        if balance < -1 {
            if let Some(right) = self.nodes[idx].right {
                // Right-Left: straighten into Right-Right first.
                if key < self.nodes[right].record.id() {
                    let pivot = self.rotate_right(right);
                    self.nodes[idx].right = Some(pivot);
                }
                return self.rotate_left(idx);
            }
        }

        idx
    }

    fn rotate_right(&mut self, y: usize) -> usize {
        let Some(x) = self.nodes[y].left else {
            return y;
        };
        let t2 = self.nodes[x].right;

        self.nodes[x].right = Some(y);
        self.nodes[y].left = t2;

        self.update_height(y);
        self.update_height(x);
        x
    }

    fn rotate_left(&mut self, x: usize) -> usize {
        let Some(y) = self.nodes[x].right else {
            return x;
        };
        let t2 = self.nodes[y].left;

        self.nodes[y].left = Some(x);
        self.nodes[x].right = t2;

        self.update_height(x);
        self.update_height(y);
        y
    }

    fn height_of(&self, node: Option<usize>) -> u32 {
        node.map_or(0, |idx| self.nodes[idx].height)
    }

    fn update_height(&mut self, idx: usize) {
        let node = &self.nodes[idx];
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.nodes[idx].height = height;
    }

    fn balance_factor(&self, idx: usize) -> i64 {
        let node = &self.nodes[idx];
        i64::from(self.height_of(node.left)) - i64::from(self.height_of(node.right))
    }
}

/// In-order iterator returned by [`SortedIndex::export_ordered`].
///
/// Holds at most one pending node per tree level.
pub struct InOrder<'a> {
    nodes: &'a [Node],
    stack: Vec<usize>,
}

impl InOrder<'_> {
    fn push_left_spine(&mut self, mut node: Option<usize>) {
        while let Some(idx) = node {
            self.stack.push(idx);
            node = self.nodes[idx].left;
        }
    }
}

impl<'a> Iterator for InOrder<'a> {
    type Item = &'a PatientRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let nodes = self.nodes;
        self.push_left_spine(nodes[idx].right);
        Some(&nodes[idx].record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::record;
    use proptest::prelude::*;

    fn patient(id: i64) -> PatientRecord {
        record(id, "P", 30, "Flu", "555")
    }

    fn ids(index: &SortedIndex) -> Vec<i64> {
        index.export_ordered().map(|r| r.id().value()).collect()
    }

    /// Walks the subtree, checking stored heights, ordering bounds and balance.
    /// Returns the recomputed height.
    fn check_subtree(
        index: &SortedIndex,
        node: Option<usize>,
        lower: Option<PatientId>,
        upper: Option<PatientId>,
    ) -> u32 {
        let Some(idx) = node else {
            return 0;
        };
        let n = &index.nodes[idx];
        let id = n.record.id();
        if let Some(lower) = lower {
            assert!(id > lower, "{id} is not above {lower}");
        }
        if let Some(upper) = upper {
            assert!(id < upper, "{id} is not below {upper}");
        }

        let left = check_subtree(index, n.left, lower, Some(id));
        let right = check_subtree(index, n.right, Some(id), upper);
        let balance = i64::from(left) - i64::from(right);
        assert!(balance.abs() <= 1, "node {id} has balance {balance}");

        let height = 1 + left.max(right);
        assert_eq!(n.height, height, "stale height at node {id}");
        height
    }

    fn assert_avl(index: &SortedIndex) {
        check_subtree(index, index.root, None, None);
    }

    #[test]
    fn test_empty_index() {
        let index = SortedIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.height(), 0);
        assert_eq!(index.export_ordered().count(), 0);
    }

    #[test]
    fn test_single_node_is_height_one() {
        let mut index = SortedIndex::new();
        assert_eq!(index.insert(patient(1)), IndexInsert::Added);
        assert_eq!(index.height(), 1);
        assert_eq!(ids(&index), vec![1]);
    }

    #[test]
    fn test_left_left_rotation() {
        let mut index = SortedIndex::new();
        for id in [3, 2, 1] {
            index.insert(patient(id));
        }
        assert_avl(&index);
        assert_eq!(index.height(), 2);
        assert_eq!(index.nodes[index.root.unwrap()].record.id(), PatientId::new(2));
    }

    #[test]
    fn test_right_right_rotation() {
        let mut index = SortedIndex::new();
        for id in [1, 2, 3] {
            index.insert(patient(id));
        }
        assert_avl(&index);
        assert_eq!(index.nodes[index.root.unwrap()].record.id(), PatientId::new(2));
    }

    #[test]
    fn test_left_right_rotation() {
        let mut index = SortedIndex::new();
        for id in [3, 1, 2] {
            index.insert(patient(id));
        }
        assert_avl(&index);
        assert_eq!(index.nodes[index.root.unwrap()].record.id(), PatientId::new(2));
    }

    #[test]
    fn test_right_left_rotation() {
        let mut index = SortedIndex::new();
        for id in [1, 3, 2] {
            index.insert(patient(id));
        }
        assert_avl(&index);
        assert_eq!(index.nodes[index.root.unwrap()].record.id(), PatientId::new(2));
    }

    #[test]
    fn test_nine_patient_scenario() {
        let mut index = SortedIndex::new();
        for id in [5, 3, 8, 1, 4, 7, 9, 2, 6] {
            index.insert(patient(id));
        }
        assert_avl(&index);
        assert_eq!(ids(&index), (1..=9).collect::<Vec<_>>());
        // ceil(1.44 * log2(10)) = 5
        assert!(index.height() <= 5);
    }

    #[test]
    fn test_ascending_inserts_stay_logarithmic() {
        let mut index = SortedIndex::new();
        for id in 1..=1024 {
            index.insert(patient(id));
        }
        assert_avl(&index);
        assert_eq!(index.len(), 1024);
        assert_eq!(index.height(), 11);
    }

    #[test]
    fn test_duplicate_replaces_record_without_new_node() {
        let mut index = SortedIndex::new();
        index.insert(patient(2));
        index.insert(patient(1));
        let outcome = index.insert(record(2, "Renamed", 80, "Critical", "000"));

        assert_eq!(outcome, IndexInsert::Replaced);
        assert_eq!(index.len(), 2);
        let names: Vec<_> = index.export_ordered().map(|r| r.name().to_string()).collect();
        assert_eq!(names, vec!["P", "Renamed"]);
        assert_avl(&index);
    }

    #[test]
    fn test_export_is_restartable() {
        let mut index = SortedIndex::new();
        for id in [10, -4, 7] {
            index.insert(patient(id));
        }
        let first = ids(&index);
        let second = ids(&index);
        assert_eq!(first, vec![-4, 7, 10]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_export_is_lazy() {
        let mut index = SortedIndex::new();
        for id in 1..=100 {
            index.insert(patient(id));
        }
        let mut iter = index.export_ordered();
        assert_eq!(iter.next().map(|r| r.id().value()), Some(1));
        assert_eq!(iter.next().map(|r| r.id().value()), Some(2));
        assert!(iter.stack.len() <= index.height() as usize);
    }

    proptest! {
        #[test]
        fn prop_any_insertion_order_is_sorted_and_balanced(
            keys in proptest::collection::vec(-500i64..500, 0..200)
        ) {
            let mut index = SortedIndex::new();
            for key in &keys {
                index.insert(patient(*key));
            }
            assert_avl(&index);

            let mut expected = keys.clone();
            expected.sort_unstable();
            expected.dedup();
            prop_assert_eq!(ids(&index), expected);
        }
    }
}
