//! Suffix-matching radix tree for host patterns.
//!
//! Keys are consumed from right to left: an edge is selected by the last
//! unconsumed byte of the search key, and a node's `suffix` is compared with
//! the trailing bytes of what remains. Hosts are most discriminative in their
//! rightmost labels, so all the subdomains of `example.com` share one path
//! from the root regardless of their length.
//!
//! Each node carries two tag sets:
//!
//! - `set`: tags of patterns that end exactly at this node;
//! - `wildcard_set`: tags of patterns that end at this node *and* were
//!   prefixed by `*`, i.e. that match any non-empty byte sequence followed by
//!   the bytes leading to this node.
//!
//! Lookups cost O(k) in the length of the key, independently of how many
//! patterns were inserted.
//!
//! ## Example
//!
//! ```rust
//! use brrtcors::origin::radix::{Tree, WILDCARD_ELEM};
//!
//! let mut tree = Tree::new();
//! tree.insert("*.example.com", 443);
//! tree.insert("example.com", WILDCARD_ELEM);
//!
//! assert!(tree.contains("api.example.com", 443));
//! assert!(!tree.contains("api.example.com", 8443));
//! assert!(tree.contains("example.com", 8443));
//! ```

use smallvec::SmallVec;

/// Sentinel tag that subsumes all others.
pub const WILDCARD_ELEM: i32 = -1;

/// Index of a node in the tree's arena.
type NodeId = usize;

const ROOT: NodeId = 0;

/// Children of a node, sorted by label.
///
/// Hosts fan out very little below the first few levels; a short sorted
/// vector searched by bisection beats a map at these sizes.
type Edges = SmallVec<[(u8, NodeId); 4]>;

/// A set of tags. Once [`WILDCARD_ELEM`] is added, the set collapses to the
/// singleton `{WILDCARD_ELEM}` and absorbs any further addition.
#[derive(Debug, Clone, Default)]
struct TagSet(SmallVec<[i32; 2]>);

impl TagSet {
    fn add(&mut self, tag: i32) {
        if tag == WILDCARD_ELEM {
            self.0.clear();
            self.0.push(WILDCARD_ELEM);
            return;
        }
        if self.0.contains(&WILDCARD_ELEM) || self.0.contains(&tag) {
            return;
        }
        self.0.push(tag);
    }

    /// Reports whether `tag`, or the sentinel, is in the set.
    #[inline]
    fn matches(&self, tag: i32) -> bool {
        self.0.iter().any(|&t| t == tag || t == WILDCARD_ELEM)
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    /// Bytes matched along the edge leading to this node; arbitrary bytes,
    /// not necessarily UTF-8 once split.
    suffix: Vec<u8>,
    edges: Edges,
    set: TagSet,
    wildcard_set: TagSet,
}

impl Node {
    fn leaf(suffix: &[u8]) -> Self {
        Self {
            suffix: suffix.to_vec(),
            ..Self::default()
        }
    }

    fn add(&mut self, tag: i32, wildcard: bool) {
        if wildcard {
            self.wildcard_set.add(tag);
        } else {
            self.set.add(tag);
        }
    }

    #[inline]
    fn child(&self, label: u8) -> Option<NodeId> {
        self.edges
            .binary_search_by_key(&label, |&(l, _)| l)
            .ok()
            .map(|i| self.edges[i].1)
    }

    /// Points the edge labelled `label` at `child`, replacing any previous one.
    fn insert_edge(&mut self, label: u8, child: NodeId) {
        match self.edges.binary_search_by_key(&label, |&(l, _)| l) {
            Ok(i) => self.edges[i].1 = child,
            Err(i) => self.edges.insert(i, (label, child)),
        }
    }
}

/// A radix tree whose edges are labelled by bytes and whose nodes each hold
/// sets of small integer tags.
///
/// Nodes live in an arena and refer to their children by index; the tree is
/// built once through [`Tree::insert`] and is then read-only, so it can be
/// shared across threads without locking.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
        }
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Inserts `tag` according to `key_pattern`.
    ///
    /// Keys are byte strings and need not be UTF-8. The pattern is processed
    /// from right to left. A leading `*` stands for
    /// any non-empty byte sequence; a `*` anywhere else is an ordinary byte.
    /// [`WILDCARD_ELEM`] as `tag` matches every tag at lookup time.
    ///
    /// Insertion stops early when a node on the way already carries `tag` in
    /// its wildcard set, since the new pattern is then implied. This is not
    /// retroactive: a wildcard pattern inserted after a narrower literal one
    /// leaves the literal entry in place.
    pub fn insert(&mut self, key_pattern: impl AsRef<[u8]>, tag: i32) {
        let (wildcard, mut search) = match key_pattern.as_ref() {
            [b'*', rest @ ..] => (true, rest),
            bytes => (false, bytes),
        };
        let mut n = ROOT;
        loop {
            let Some(&label) = search.last() else {
                self.nodes[n].add(tag, wildcard);
                return;
            };
            if self.nodes[n].wildcard_set.matches(tag) {
                return;
            }

            let Some(child) = self.nodes[n].child(label) else {
                let leaf = self.push(Node::leaf(search));
                self.nodes[leaf].add(tag, wildcard);
                self.nodes[n].insert_edge(label, leaf);
                return;
            };

            let child_len = self.nodes[child].suffix.len();
            let overlap = common_suffix_len(search, &self.nodes[child].suffix);
            if overlap == child_len {
                // the child's suffix is a suffix of search
                search = &search[..search.len() - overlap];
                n = child;
                continue;
            }

            // split the child: `mid` keeps the shared tail, the child keeps
            // the rest of its suffix beneath it
            let (rest, shared) = search.split_at(search.len() - overlap);
            let mid = self.push(Node::leaf(shared));
            self.nodes[n].insert_edge(label, mid);
            let byte_before = self.nodes[child].suffix[child_len - 1 - overlap];
            self.nodes[child].suffix.truncate(child_len - overlap);
            self.nodes[mid].insert_edge(byte_before, child);

            match rest.last() {
                None => self.nodes[mid].add(tag, wildcard),
                Some(&rest_label) => {
                    let leaf = self.push(Node::leaf(rest));
                    self.nodes[leaf].add(tag, wildcard);
                    self.nodes[mid].insert_edge(rest_label, leaf);
                }
            }
            return;
        }
    }

    /// Reports whether the tree contains the key-tag pair `(key, tag)`.
    #[must_use]
    pub fn contains(&self, key: impl AsRef<[u8]>, tag: i32) -> bool {
        let mut n = &self.nodes[ROOT];
        let mut search = key.as_ref();
        loop {
            let Some(&label) = search.last() else {
                return n.set.matches(tag);
            };
            // a non-empty remainder is all a wildcard needs
            if n.wildcard_set.matches(tag) {
                return true;
            }
            let Some(child) = n.child(label) else {
                return false;
            };
            n = &self.nodes[child];
            if !search.ends_with(&n.suffix) {
                return false;
            }
            search = &search[..search.len() - n.suffix.len()];
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }
}

/// Length of the longest common suffix of `a` and `b`.
fn common_suffix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}
