//! Byte-wise address prefix tree.
//!
//! Addresses are grouped by length (4 bytes for IPv4, 16 for IPv6) and stored
//! one byte per level. The number of distinct entries is bounded: once it
//! exceeds the limit, the cheapest node that holds two or more entries, each
//! under a different child, is folded. Its prefix becomes a single entry that
//! absorbs every later address underneath it. Every fold lowers the entry
//! count, and an address alone under its first byte is never folded, so
//! heavy talkers keep their full address while the long tail collapses into
//! prefixes.
//!
//! Folding stops below the family root. When every remaining entry sits alone
//! under its own first byte there is nothing left to merge and the tree may
//! hold more entries than the limit (at most 256 per address family).

use std::collections::BTreeMap;
use std::net::{Ipv4Addr, Ipv6Addr};

use tracing::trace;

/// Default bound on distinct entries (addresses plus folded prefixes).
pub const DEFAULT_MAX_LEAVES: usize = 1024;

#[derive(Debug, Default, Clone)]
struct Node {
    children: BTreeMap<u8, Node>,
    /// Hits recorded at this node: a full address, or a folded prefix.
    count: u64,
    /// `count` plus every descendant's hits.
    tsum: u64,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Full addresses and folded prefixes at or below this node.
    fn entry_count(&self) -> usize {
        if self.is_leaf() {
            usize::from(self.count > 0)
        } else {
            self.children.values().map(Node::entry_count).sum()
        }
    }
}

/// Candidate for folding: family length, path from the family root, cost.
struct FoldCandidate {
    family: usize,
    path: Vec<u8>,
    tsum: u64,
}

/// Prefix tree over raw address bytes.
#[derive(Debug, Clone)]
pub struct IpTree {
    families: BTreeMap<usize, Node>,
    max_leaves: usize,
    leaves: usize,
    total: u64,
}

impl Default for IpTree {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEAVES)
    }
}

impl IpTree {
    pub fn new(max_leaves: usize) -> Self {
        Self {
            families: BTreeMap::new(),
            max_leaves: max_leaves.max(1),
            leaves: 0,
            total: 0,
        }
    }

    /// Total number of addresses added.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Distinct entries currently held.
    pub fn leaf_count(&self) -> usize {
        self.leaves
    }

    /// Records one occurrence of `addr`. The slice length selects the family.
    pub fn add(&mut self, addr: &[u8]) {
        if addr.is_empty() {
            return;
        }
        self.total += 1;

        let len = addr.len();
        let mut node = self.families.entry(len).or_default();
        for &byte in addr {
            node.tsum += 1;
            if node.is_leaf() && node.count > 0 {
                // Folded prefix.
                node.count += 1;
                return;
            }
            node = node.children.entry(byte).or_default();
        }
        node.tsum += 1;
        node.count += 1;
        if node.count == 1 {
            self.leaves += 1;
            if self.leaves > self.max_leaves {
                self.prune();
            }
        }
    }

    /// Folds cheapest subtrees until the entry count fits the bound.
    fn prune(&mut self) {
        while self.leaves > self.max_leaves {
            let Some(candidate) = self.cheapest_foldable() else {
                trace!(leaves = self.leaves, "nothing left to fold");
                break;
            };
            let Some(root) = self.families.get_mut(&candidate.family) else {
                break;
            };
            let mut node = root;
            for byte in &candidate.path {
                match node.children.get_mut(byte) {
                    Some(child) => node = child,
                    None => return,
                }
            }
            let removed = node.entry_count();
            node.count = node.tsum;
            node.children.clear();
            self.leaves = self.leaves + 1 - removed;
            trace!(
                family = candidate.family,
                depth = candidate.path.len(),
                tsum = candidate.tsum,
                removed,
                "folded prefix"
            );
        }
    }

    fn cheapest_foldable(&self) -> Option<FoldCandidate> {
        let mut best: Option<FoldCandidate> = None;
        let mut path = Vec::new();
        for (&family, root) in &self.families {
            for (&byte, child) in &root.children {
                path.push(byte);
                Self::visit_foldable(family, child, &mut path, &mut best);
                path.pop();
            }
        }
        best
    }

    /// Returns the number of entries under `node`. A node qualifies for
    /// folding when it holds at least two entries and each child holds one.
    fn visit_foldable(
        family: usize,
        node: &Node,
        path: &mut Vec<u8>,
        best: &mut Option<FoldCandidate>,
    ) -> usize {
        if node.is_leaf() {
            return usize::from(node.count > 0);
        }
        let mut entries = 0;
        let mut single_entry_children = true;
        for (&byte, child) in &node.children {
            path.push(byte);
            let below = Self::visit_foldable(family, child, path, best);
            path.pop();
            entries += below;
            single_entry_children &= below == 1;
        }
        if entries >= 2
            && single_entry_children
            && best.as_ref().is_none_or(|b| node.tsum < b.tsum)
        {
            *best = Some(FoldCandidate {
                family,
                path: path.clone(),
                tsum: node.tsum,
            });
        }
        entries
    }

    /// Every entry with its count, in tree order.
    pub fn entries(&self) -> Vec<(String, u64)> {
        let mut out = Vec::with_capacity(self.leaves);
        let mut path = Vec::new();
        for (&family, root) in &self.families {
            Self::collect(family, root, &mut path, &mut out);
        }
        out
    }

    fn collect(family: usize, node: &Node, path: &mut Vec<u8>, out: &mut Vec<(String, u64)>) {
        if node.count > 0 {
            out.push((prefix_label(family, path), node.count));
        }
        for (&byte, child) in &node.children {
            path.push(byte);
            Self::collect(family, child, path, out);
            path.pop();
        }
    }
}

/// Renders an address or prefix of a `family`-byte address.
///
/// Full addresses print plainly; shorter prefixes get a `/bits` suffix.
pub fn prefix_label(family: usize, prefix: &[u8]) -> String {
    let mut padded = prefix.to_vec();
    padded.resize(family, 0);

    let addr = match family {
        4 => Ipv4Addr::new(padded[0], padded[1], padded[2], padded[3]).to_string(),
        16 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(&padded);
            Ipv6Addr::from(octets).to_string()
        }
        _ => padded
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(":"),
    };

    if prefix.len() < family {
        format!("{}/{}", addr, prefix.len() * 8)
    } else {
        addr
    }
}
