//! RadixIndex: a compressed trie over tokens
//!
//! Each edge carries a byte-string label (a shared prefix), not a single
//! character — a classic radix / Patricia trie. Children hang off a node in
//! a small `Vec` kept sorted by first byte; tokenized text has a small
//! branching factor in practice, so a sorted vec beats a hash map on cache
//! behavior here. Terminal nodes carry a posting map from [`InternalId`] to
//! an occurrence count (the term frequency for that document).

use crate::id::InternalId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A word's posting map, in first-inserted order — the order documents were
/// credited with an occurrence of this word, not hash-bucket order.
pub type Postings = IndexMap<InternalId, u32>;

/// `(word, postings)` pairs produced by [`RadixIndex::find`], in discovery
/// order. Kept as a `Vec` rather than a map — callers need the order
/// preserved and duplicates cannot occur (each word has exactly one
/// terminal node).
pub type FoundWords = Vec<(String, Postings)>;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RadixNode {
    label: Vec<u8>,
    children: Vec<(u8, Box<RadixNode>)>,
    postings: Option<Postings>,
}

impl RadixNode {
    fn new(label: Vec<u8>) -> Self {
        Self {
            label,
            children: Vec::new(),
            postings: None,
        }
    }

    fn is_empty_leaf(&self) -> bool {
        self.postings.is_none() && self.children.is_empty()
    }
}

/// A compressed trie mapping tokens to posting maps, supporting exact and
/// edit-distance-tolerant lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadixIndex {
    root: RadixNode,
    is_array: bool,
}

impl RadixIndex {
    pub fn new(is_array: bool) -> Self {
        Self {
            root: RadixNode::new(Vec::new()),
            is_array,
        }
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// Tokenizes `text` and inserts each resulting token, crediting
    /// `internal_id` with one more occurrence of that token.
    pub fn insert(
        &mut self,
        text: &str,
        internal_id: InternalId,
        tokenizer: &dyn crate::tokenizer::Tokenizer,
        language: Option<&str>,
        property: Option<&str>,
    ) {
        for token in tokenizer.tokenize(text, language, property) {
            self.insert_token(&token, internal_id);
        }
    }

    fn insert_token(&mut self, token: &str, internal_id: InternalId) {
        insert_into(&mut self.root, token.as_bytes(), internal_id);
    }

    /// Locates terminal(s) matching `term`.
    ///
    /// `exact`: only the exact terminal, if any. Otherwise: descend to the
    /// longest prefix of `term` reachable by following edges, then collect
    /// every terminal descendant of that point whose reconstructed word is
    /// within `tolerance` edits of `term` (tolerance 0 degenerates to an
    /// exact match, since edit distance 0 implies equality).
    pub fn find(&self, term: &str, exact: bool, tolerance: usize) -> FoundWords {
        let key = term.as_bytes();
        if exact {
            return match exact_node(&self.root, key) {
                Some(node) => match &node.postings {
                    Some(postings) => vec![(term.to_string(), postings.clone())],
                    None => Vec::new(),
                },
                None => Vec::new(),
            };
        }

        let (node, prefix) = find_prefix_node(&self.root, key);
        let mut terminals = Vec::new();
        collect_terminals(node, &prefix, &mut terminals);

        if term.is_empty() {
            // An empty token matches every terminal (§4.1's "caller still
            // wants matches" edge case), rather than being filtered by edit
            // distance against the empty string.
            return terminals;
        }

        terminals
            .into_iter()
            .filter(|(word, _)| edit_distance(word, term) <= tolerance)
            .collect()
    }

    /// Removes `internal_id` from the exact terminal for `word`, pruning
    /// any interior edges left empty.
    pub fn remove_document_by_word(&mut self, word: &str, internal_id: InternalId) {
        remove_from(&mut self.root, word.as_bytes(), internal_id);
    }

    /// Accumulates each `(word, postings)` pair's contribution into
    /// `results_map`: `boost * term_frequency(word, id) * idf(word)`, where
    /// `idf(word) = ln((total_docs + 1) / (docs_containing(word) + 1))`
    /// (additive smoothing avoids a zero or negative argument to `ln`).
    pub fn calculate_score(
        found_words: &FoundWords,
        results_map: &mut IndexMap<InternalId, f32>,
        boost: f32,
        total_docs: u32,
    ) {
        for (_, postings) in found_words {
            let docs_containing = postings.len() as f32;
            let idf = ((total_docs as f32 + 1.0) / (docs_containing + 1.0)).ln();
            for (&id, &tf) in postings {
                *results_map.entry(id).or_insert(0.0) += boost * tf as f32 * idf;
            }
        }
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

fn insert_into(node: &mut RadixNode, key: &[u8], internal_id: InternalId) {
    if key.is_empty() {
        let postings = node.postings.get_or_insert_with(IndexMap::new);
        *postings.entry(internal_id).or_insert(0) += 1;
        return;
    }

    if let Some(idx) = node.children.iter().position(|(b, _)| *b == key[0]) {
        let common = common_prefix_len(&node.children[idx].1.label, key);
        let label_len = node.children[idx].1.label.len();

        if common < label_len {
            split_edge(&mut node.children[idx].1, common);
        }
        insert_into(&mut node.children[idx].1, &key[common..], internal_id);
    } else {
        let mut new_node = RadixNode::new(key.to_vec());
        let mut postings = IndexMap::new();
        postings.insert(internal_id, 1);
        new_node.postings = Some(postings);
        node.children.push((key[0], Box::new(new_node)));
        node.children.sort_by_key(|(b, _)| *b);
    }
}

/// Splits `node`'s edge at `at`: the first `at` bytes stay on `node`, and
/// the remainder (together with `node`'s old postings and children) moves
/// into a new single child.
fn split_edge(node: &mut RadixNode, at: usize) {
    let remaining = node.label.split_off(at);
    let moved = RadixNode {
        label: remaining,
        children: std::mem::take(&mut node.children),
        postings: node.postings.take(),
    };
    let first_byte = moved.label[0];
    node.children = vec![(first_byte, Box::new(moved))];
}

fn exact_node<'a>(node: &'a RadixNode, key: &[u8]) -> Option<&'a RadixNode> {
    if key.is_empty() {
        return Some(node);
    }
    let (_, child) = node.children.iter().find(|(b, _)| *b == key[0])?;
    let common = common_prefix_len(&child.label, key);
    if common != child.label.len() {
        return None;
    }
    exact_node(child, &key[common..])
}

/// Walks as far as possible matching `key` byte-for-byte along edges,
/// stopping at the first node reached without fully consuming `key` along
/// an edge — either because no child matches the next byte, or because the
/// matched edge only partially agrees with the remaining key. Returns that
/// node together with the real byte prefix from the root to its parent
/// (the node's own label is not included, so callers must append it).
fn find_prefix_node<'a>(root: &'a RadixNode, key: &[u8]) -> (&'a RadixNode, Vec<u8>) {
    let mut node = root;
    let mut prefix = Vec::new();
    let mut remaining = key;

    loop {
        if remaining.is_empty() {
            break;
        }
        match node.children.iter().find(|(b, _)| *b == remaining[0]) {
            Some((_, child)) => {
                let common = common_prefix_len(&child.label, remaining);
                if common == child.label.len() && common < remaining.len() {
                    prefix.extend_from_slice(&child.label);
                    node = child;
                    remaining = &remaining[common..];
                } else {
                    node = child;
                    break;
                }
            }
            None => break,
        }
    }

    (node, prefix)
}

fn collect_terminals(node: &RadixNode, prefix: &[u8], out: &mut Vec<(String, Postings)>) {
    let mut full = prefix.to_vec();
    full.extend_from_slice(&node.label);

    if let Some(postings) = &node.postings {
        if let Ok(word) = String::from_utf8(full.clone()) {
            out.push((word, postings.clone()));
        }
    }
    for (_, child) in &node.children {
        collect_terminals(child, &full, out);
    }
}

fn remove_from(node: &mut RadixNode, key: &[u8], internal_id: InternalId) -> bool {
    if key.is_empty() {
        if let Some(postings) = &mut node.postings {
            postings.remove(&internal_id);
            if postings.is_empty() {
                node.postings = None;
            }
        }
        return node.is_empty_leaf();
    }

    let Some(idx) = node.children.iter().position(|(b, _)| *b == key[0]) else {
        return false;
    };
    let common = common_prefix_len(&node.children[idx].1.label, key);
    if common != node.children[idx].1.label.len() {
        return false;
    }

    let child_is_empty = remove_from(&mut node.children[idx].1, &key[common..], internal_id);
    if child_is_empty {
        node.children.remove(idx);
    }
    node.is_empty_leaf()
}

/// Classic Levenshtein edit distance with a single rolling row.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        cur[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            cur[j] = (prev[j] + 1).min(cur[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}
