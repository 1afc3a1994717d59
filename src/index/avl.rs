//! AVLIndex: a self-balancing BST ordered by a numeric key
//!
//! Each node carries a posting list (insertion-ordered, duplicates allowed —
//! the same id can appear under one key more than once when an array
//! property inserts repeated values) of [`InternalId`]s for its key.
//! Rebalancing uses the standard AVL rotations, gated by a configurable
//! skew tolerance `t` rather than the usual strict `> 1`.

use crate::id::InternalId;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

type Key = OrderedFloat<f64>;

#[derive(Serialize, Deserialize)]
struct AvlNode {
    key: Key,
    postings: Vec<InternalId>,
    height: i32,
    left: Option<Box<AvlNode>>,
    right: Option<Box<AvlNode>>,
}

impl AvlNode {
    fn leaf(key: Key, id: InternalId) -> Box<Self> {
        Box::new(Self {
            key,
            postings: vec![id],
            height: 1,
            left: None,
            right: None,
        })
    }
}

fn height(node: &Option<Box<AvlNode>>) -> i32 {
    node.as_ref().map_or(0, |n| n.height)
}

fn update_height(node: &mut AvlNode) {
    node.height = 1 + height(&node.left).max(height(&node.right));
}

fn balance_factor(node: &AvlNode) -> i32 {
    height(&node.left) - height(&node.right)
}

fn rotate_right(mut node: Box<AvlNode>) -> Box<AvlNode> {
    let mut left = node.left.take().expect("rotate_right requires a left child");
    node.left = left.right.take();
    update_height(&mut node);
    left.right = Some(node);
    update_height(&mut left);
    left
}

fn rotate_left(mut node: Box<AvlNode>) -> Box<AvlNode> {
    let mut right = node.right.take().expect("rotate_left requires a right child");
    node.right = right.left.take();
    update_height(&mut node);
    right.left = Some(node);
    update_height(&mut right);
    right
}

/// Rebalances `node` if its skew exceeds `t`, after `update_height`.
fn rebalance(mut node: Box<AvlNode>, t: i32) -> Box<AvlNode> {
    update_height(&mut node);
    let balance = balance_factor(&node);

    if balance > t {
        if balance_factor(node.left.as_ref().unwrap()) < 0 {
            let left = node.left.take().unwrap();
            node.left = Some(rotate_left(left));
        }
        return rotate_right(node);
    }
    if balance < -t {
        if balance_factor(node.right.as_ref().unwrap()) > 0 {
            let right = node.right.take().unwrap();
            node.right = Some(rotate_right(right));
        }
        return rotate_left(node);
    }
    node
}

fn insert_node(node: Option<Box<AvlNode>>, key: Key, id: InternalId, t: i32) -> Box<AvlNode> {
    let mut node = match node {
        None => return AvlNode::leaf(key, id),
        Some(n) => n,
    };

    if key < node.key {
        node.left = Some(insert_node(node.left.take(), key, id, t));
    } else if key > node.key {
        node.right = Some(insert_node(node.right.take(), key, id, t));
    } else {
        node.postings.push(id);
        return node;
    }

    rebalance(node, t)
}

/// Removes `id` from the posting list at `key`; the node itself is kept
/// even if the list becomes empty (the spec does not require reclaiming
/// emptied numeric nodes, matching the teacher's conservative B-tree
/// deletion policy of leaving structure in place).
fn remove_id(node: &mut Option<Box<AvlNode>>, key: Key, id: InternalId) {
    if let Some(n) = node {
        if key < n.key {
            remove_id(&mut n.left, key, id);
        } else if key > n.key {
            remove_id(&mut n.right, key, id);
        } else {
            n.postings.retain(|&existing| existing != id);
        }
    }
}

fn find_exact<'a>(node: &'a Option<Box<AvlNode>>, key: Key) -> Option<&'a [InternalId]> {
    let n = node.as_ref()?;
    if key < n.key {
        find_exact(&n.left, key)
    } else if key > n.key {
        find_exact(&n.right, key)
    } else {
        Some(&n.postings)
    }
}

fn collect_range(node: &Option<Box<AvlNode>>, min: Key, max: Key, out: &mut Vec<InternalId>) {
    let Some(n) = node else { return };
    if n.key > min {
        collect_range(&n.left, min, max, out);
    }
    if n.key >= min && n.key <= max {
        out.extend_from_slice(&n.postings);
    }
    if n.key < max {
        collect_range(&n.right, min, max, out);
    }
}

fn collect_greater_than(node: &Option<Box<AvlNode>>, key: Key, inclusive: bool, out: &mut Vec<InternalId>) {
    let Some(n) = node else { return };
    collect_greater_than(&n.left, key, inclusive, out);
    let matches = if inclusive { n.key >= key } else { n.key > key };
    if matches {
        out.extend_from_slice(&n.postings);
    }
    collect_greater_than(&n.right, key, inclusive, out);
}

fn collect_less_than(node: &Option<Box<AvlNode>>, key: Key, inclusive: bool, out: &mut Vec<InternalId>) {
    let Some(n) = node else { return };
    collect_less_than(&n.left, key, inclusive, out);
    let matches = if inclusive { n.key <= key } else { n.key < key };
    if matches {
        out.extend_from_slice(&n.postings);
    }
    collect_less_than(&n.right, key, inclusive, out);
}

/// Ordered map from `f64` key to posting list, with range/threshold queries.
#[derive(Serialize, Deserialize)]
pub struct AVLIndex {
    root: Option<Box<AvlNode>>,
    is_array: bool,
}

impl AVLIndex {
    pub fn new(is_array: bool) -> Self {
        Self {
            root: None,
            is_array,
        }
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn insert(&mut self, key: f64, id: InternalId, rebalance_threshold: u32) {
        let t = rebalance_threshold as i32;
        self.root = Some(insert_node(self.root.take(), OrderedFloat(key), id, t));
    }

    pub fn find(&self, key: f64) -> Option<&[InternalId]> {
        find_exact(&self.root, OrderedFloat(key))
    }

    /// Returns ids in-order; the same id may appear more than once if it was
    /// inserted at several keys within `[min, max]` (e.g. array values).
    pub fn range_search(&self, min: f64, max: f64) -> Vec<InternalId> {
        if min > max {
            return Vec::new();
        }
        let mut out = Vec::new();
        collect_range(&self.root, OrderedFloat(min), OrderedFloat(max), &mut out);
        out
    }

    pub fn greater_than(&self, key: f64, inclusive: bool) -> Vec<InternalId> {
        let mut out = Vec::new();
        collect_greater_than(&self.root, OrderedFloat(key), inclusive, &mut out);
        out
    }

    pub fn less_than(&self, key: f64, inclusive: bool) -> Vec<InternalId> {
        let mut out = Vec::new();
        collect_less_than(&self.root, OrderedFloat(key), inclusive, &mut out);
        out
    }

    pub fn remove_document(&mut self, id: InternalId, key: f64) {
        remove_id(&mut self.root, OrderedFloat(key), id);
    }
}
