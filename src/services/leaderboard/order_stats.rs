//! Order-statistics backing structure for one leaderboard.
//!
//! An arena-allocated AVL tree augmented with subtree sizes, keyed by
//! (score desc, tie-break asc, identity asc), paired with an identity index.
//! Gives O(log n) upsert/remove/rank and O(log n + count) range extraction.
//!
//! Not thread-safe on its own; `LeaderboardStore` wraps it in a lock.

use std::cmp::Ordering;
use std::collections::HashMap;

use uuid::Uuid;

use crate::models::ScoredEntity;

/// Strict total-order key: score descending, then tie-break ascending
/// (earlier achievement wins), then identity ascending. The identity
/// component keeps the order strict even when score and tie-break collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OrderKey {
    pub score: i64,
    pub tie_break: i64,
    pub identity: Uuid,
}

impl OrderKey {
    pub(crate) fn of(entity: &ScoredEntity) -> Self {
        Self {
            score: entity.score,
            tie_break: entity.tie_break,
            identity: entity.identity,
        }
    }
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.tie_break.cmp(&other.tie_break))
            .then_with(|| self.identity.cmp(&other.identity))
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone)]
struct Node {
    key: OrderKey,
    payload: Uuid,
    left: Option<usize>,
    right: Option<usize>,
    height: i32,
    size: usize,
}

/// The tree itself. Nodes live in an arena (`nodes`) and are linked by
/// index, so rotations never move a node and the identity index stays
/// valid across rebalancing. Removed slots are recycled through `free`.
#[derive(Debug, Clone, Default)]
pub(crate) struct RankTree {
    nodes: Vec<Node>,
    free: Vec<usize>,
    root: Option<usize>,
    index: HashMap<Uuid, usize>,
}

impl RankTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from entries already sorted by `OrderKey` with unique
    /// identities. O(n): nodes are allocated in rank order, then linked
    /// into a height-balanced shape by midpoint recursion.
    pub fn from_sorted(entries: &[ScoredEntity]) -> Self {
        let mut tree = Self {
            nodes: Vec::with_capacity(entries.len()),
            free: Vec::new(),
            root: None,
            index: HashMap::with_capacity(entries.len()),
        };
        for entity in entries {
            let idx = tree.alloc(OrderKey::of(entity), entity.payload);
            tree.index.insert(entity.identity, idx);
        }
        tree.root = tree.link_balanced(0, entries.len());
        tree
    }

    pub fn len(&self) -> usize {
        self.subtree_size(self.root)
    }

    pub fn contains(&self, identity: &Uuid) -> bool {
        self.index.contains_key(identity)
    }

    pub fn get(&self, identity: &Uuid) -> Option<ScoredEntity> {
        self.index.get(identity).map(|&idx| self.entity_at(idx))
    }

    /// Insert or reposition one identity. Returns true when the identity
    /// was not present before. An upsert with an unchanged (score,
    /// tie-break) only refreshes the payload and never moves the entry.
    pub fn upsert(&mut self, entity: ScoredEntity) -> bool {
        let fresh = match self.index.get(&entity.identity).copied() {
            Some(idx) => {
                let key = self.nodes[idx].key;
                if key.score == entity.score && key.tie_break == entity.tie_break {
                    self.nodes[idx].payload = entity.payload;
                    return false;
                }
                self.detach(&key);
                false
            }
            None => true,
        };

        let idx = self.alloc(OrderKey::of(&entity), entity.payload);
        self.index.insert(entity.identity, idx);
        self.root = Some(self.insert_rec(self.root, idx));
        fresh
    }

    /// Remove one identity. Returns false (no-op) when absent.
    pub fn remove(&mut self, identity: &Uuid) -> bool {
        let Some(&idx) = self.index.get(identity) else {
            return false;
        };
        let key = self.nodes[idx].key;
        self.detach(&key);
        true
    }

    /// 1-based rank of an identity, descending from the root and counting
    /// the sizes of skipped left subtrees.
    pub fn rank(&self, identity: &Uuid) -> Option<i64> {
        let &idx = self.index.get(identity)?;
        let key = self.nodes[idx].key;
        let mut node = self.root;
        let mut preceding = 0usize;
        while let Some(i) = node {
            match key.cmp(&self.nodes[i].key) {
                Ordering::Less => node = self.nodes[i].left,
                Ordering::Equal => {
                    return Some((preceding + self.subtree_size(self.nodes[i].left) + 1) as i64);
                }
                Ordering::Greater => {
                    preceding += self.subtree_size(self.nodes[i].left) + 1;
                    node = self.nodes[i].right;
                }
            }
        }
        // The index and the tree always hold the same identities.
        None
    }

    /// In-order extraction: skip `skip` entries, then yield up to `take`.
    /// Subtree sizes let whole subtrees be skipped without visiting them.
    pub fn range(&self, skip: usize, take: usize) -> Vec<ScoredEntity> {
        let available = self.len().saturating_sub(skip);
        let mut out = Vec::with_capacity(take.min(available));
        self.collect_range(self.root, skip, take, &mut out);
        out
    }

    // ---- arena plumbing ----

    fn alloc(&mut self, key: OrderKey, payload: Uuid) -> usize {
        let node = Node {
            key,
            payload,
            left: None,
            right: None,
            height: 1,
            size: 1,
        };
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn entity_at(&self, idx: usize) -> ScoredEntity {
        let node = &self.nodes[idx];
        ScoredEntity {
            identity: node.key.identity,
            score: node.key.score,
            tie_break: node.key.tie_break,
            payload: node.payload,
        }
    }

    fn subtree_size(&self, node: Option<usize>) -> usize {
        node.map_or(0, |i| self.nodes[i].size)
    }

    fn height(&self, node: Option<usize>) -> i32 {
        node.map_or(0, |i| self.nodes[i].height)
    }

    // ---- balanced insertion / removal ----

    fn link_balanced(&mut self, lo: usize, hi: usize) -> Option<usize> {
        if lo >= hi {
            return None;
        }
        let mid = lo + (hi - lo) / 2;
        // Arena index equals sorted position during from_sorted.
        let left = self.link_balanced(lo, mid);
        let right = self.link_balanced(mid + 1, hi);
        self.nodes[mid].left = left;
        self.nodes[mid].right = right;
        self.refresh(mid);
        Some(mid)
    }

    fn insert_rec(&mut self, node: Option<usize>, new_idx: usize) -> usize {
        let Some(i) = node else {
            return new_idx;
        };
        // Keys are strictly unique; upsert detaches the old key first.
        if self.nodes[new_idx].key < self.nodes[i].key {
            let left = self.insert_rec(self.nodes[i].left, new_idx);
            self.nodes[i].left = Some(left);
        } else {
            let right = self.insert_rec(self.nodes[i].right, new_idx);
            self.nodes[i].right = Some(right);
        }
        self.rebalance(i)
    }

    fn detach(&mut self, key: &OrderKey) {
        let (root, removed) = self.remove_rec(self.root, key);
        self.root = root;
        if let Some(idx) = removed {
            self.index.remove(&self.nodes[idx].key.identity);
            self.free.push(idx);
        }
    }

    fn remove_rec(
        &mut self,
        node: Option<usize>,
        key: &OrderKey,
    ) -> (Option<usize>, Option<usize>) {
        let Some(i) = node else {
            return (None, None);
        };
        match key.cmp(&self.nodes[i].key) {
            Ordering::Less => {
                let (left, removed) = self.remove_rec(self.nodes[i].left, key);
                self.nodes[i].left = left;
                (Some(self.rebalance(i)), removed)
            }
            Ordering::Greater => {
                let (right, removed) = self.remove_rec(self.nodes[i].right, key);
                self.nodes[i].right = right;
                (Some(self.rebalance(i)), removed)
            }
            Ordering::Equal => match (self.nodes[i].left, self.nodes[i].right) {
                (None, child) | (child, None) => (child, Some(i)),
                (Some(_), Some(right)) => {
                    // Relink the in-order successor in place of the removed
                    // node; indices never change, so the identity index
                    // stays untouched.
                    let (new_right, successor) = self.detach_min(right);
                    self.nodes[successor].left = self.nodes[i].left;
                    self.nodes[successor].right = new_right;
                    (Some(self.rebalance(successor)), Some(i))
                }
            },
        }
    }

    fn detach_min(&mut self, i: usize) -> (Option<usize>, usize) {
        match self.nodes[i].left {
            None => (self.nodes[i].right, i),
            Some(left) => {
                let (new_left, min) = self.detach_min(left);
                self.nodes[i].left = new_left;
                (Some(self.rebalance(i)), min)
            }
        }
    }

    fn refresh(&mut self, i: usize) {
        let (left, right) = (self.nodes[i].left, self.nodes[i].right);
        self.nodes[i].height = 1 + self.height(left).max(self.height(right));
        self.nodes[i].size = 1 + self.subtree_size(left) + self.subtree_size(right);
    }

    fn balance_factor(&self, i: usize) -> i32 {
        self.height(self.nodes[i].left) - self.height(self.nodes[i].right)
    }

    fn rotate_left(&mut self, i: usize) -> usize {
        let r = self.nodes[i].right.expect("rotate_left needs a right child");
        self.nodes[i].right = self.nodes[r].left;
        self.nodes[r].left = Some(i);
        self.refresh(i);
        self.refresh(r);
        r
    }

    fn rotate_right(&mut self, i: usize) -> usize {
        let l = self.nodes[i].left.expect("rotate_right needs a left child");
        self.nodes[i].left = self.nodes[l].right;
        self.nodes[l].right = Some(i);
        self.refresh(i);
        self.refresh(l);
        l
    }

    fn rebalance(&mut self, i: usize) -> usize {
        self.refresh(i);
        let balance = self.balance_factor(i);
        if balance > 1 {
            let left = self.nodes[i].left.expect("left-heavy node has a left child");
            if self.balance_factor(left) < 0 {
                let new_left = self.rotate_left(left);
                self.nodes[i].left = Some(new_left);
            }
            self.rotate_right(i)
        } else if balance < -1 {
            let right = self
                .nodes[i]
                .right
                .expect("right-heavy node has a right child");
            if self.balance_factor(right) > 0 {
                let new_right = self.rotate_right(right);
                self.nodes[i].right = Some(new_right);
            }
            self.rotate_left(i)
        } else {
            i
        }
    }

    fn collect_range(
        &self,
        node: Option<usize>,
        skip: usize,
        take: usize,
        out: &mut Vec<ScoredEntity>,
    ) {
        let Some(i) = node else {
            return;
        };
        if take == 0 {
            return;
        }
        let (left, right) = (self.nodes[i].left, self.nodes[i].right);
        let left_size = self.subtree_size(left);
        if skip > left_size {
            // Skip the whole left subtree and this node.
            self.collect_range(right, skip - left_size - 1, take, out);
            return;
        }
        let from_left = (left_size - skip).min(take);
        self.collect_range(left, skip, from_left, out);
        let mut remaining = take - from_left;
        if remaining > 0 {
            out.push(self.entity_at(i));
            remaining -= 1;
            if remaining > 0 {
                self.collect_range(right, 0, remaining, out);
            }
        }
    }
}
