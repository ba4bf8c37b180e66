//! Implementation of the radix tree.

mod iter;

pub use iter::Iter;

use log::{debug, trace};

use crate::prefix::{
    addr_eq_masked, bit_set, first_differ_bit, RadixPrefix, SharedPrefix, Slot, SLOT_COUNT,
};
use crate::RadixError;

/// Hard ceiling on the `maxbits` bound of any tree.
pub const RADIX_MAXBITS: u8 = 128;

/// A stable reference to a stored prefix, returned by
/// [`RadixTree::insert`] and [`RadixTree::search`].
///
/// Handles are generational: once the node is removed (or demoted to a pure
/// branching point), every outstanding handle to it goes stale, and
/// handle-taking operations reject it instead of touching a reused slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHandle {
    idx: usize,
    gen: u32,
}

/// A binary radix (PATRICIA) tree over [`RadixPrefix`] keys with
/// longest-prefix-match lookups and four payload slots per node, one per
/// (family, ecs) combination.
///
/// All nodes live in a single arena; child, parent and root links are
/// indices into it, and removed slots are recycled through a free list.
/// The structure is not internally synchronized: concurrent readers are
/// fine, but writers must be serialized by the caller.
#[derive(Clone)]
pub struct RadixTree<T> {
    pub(crate) table: Vec<Node<T>>,
    free: Vec<usize>,
    pub(crate) root: Option<usize>,
    maxbits: u8,
    len: usize,
    num_active_node: u32,
    num_added_node: i32,
}

impl<T> Default for RadixTree<T> {
    fn default() -> Self {
        Self::new(RADIX_MAXBITS)
    }
}

impl<T> RadixTree<T> {
    /// Create an empty tree accepting prefixes up to `maxbits` bits (32 for
    /// a v4-only tree, 128 for dual-stack).
    ///
    /// Panics if `maxbits` exceeds [`RADIX_MAXBITS`].
    pub fn new(maxbits: u8) -> Self {
        assert!(
            maxbits <= RADIX_MAXBITS,
            "maxbits {maxbits} exceeds the compile-time ceiling {RADIX_MAXBITS}"
        );
        Self {
            table: Vec::new(),
            free: Vec::new(),
            root: None,
            maxbits,
            len: 0,
            num_active_node: 0,
            num_added_node: 0,
        }
    }

    /// The prefix-length bound this tree was created with.
    pub fn maxbits(&self) -> u8 {
        self.maxbits
    }

    /// Number of stored prefixes (glue nodes are not counted).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the tree stores no prefixes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of live nodes, including glue. Always matches the number of
    /// nodes reachable from the root.
    pub fn active_nodes(&self) -> u32 {
        self.num_active_node
    }

    /// Value of the monotonic insertion counter that seeds each node's
    /// per-slot insertion numbers.
    pub fn added_nodes(&self) -> i32 {
        self.num_added_node
    }

    /// Insert a prefix, deep-copying the caller's value. Use this when the
    /// prefix is a throwaway local; the tree never aliases it.
    ///
    /// Returns a handle to the (new or already existing) node; the caller
    /// attaches payload with [`Self::set_data`]. Inserting a prefix that is
    /// already present returns the existing node and keeps its insertion
    /// numbers, except that a slot still unused gains a fresh number.
    ///
    /// A [`Family::Unspec`](crate::Family) prefix claims all four slots
    /// with a single insertion number, making it match queries of every
    /// family.
    ///
    /// Panics if the prefix length exceeds the tree's `maxbits`.
    ///
    /// ```
    /// use std::net::Ipv4Addr;
    /// use radix_prefix::{RadixPrefix, RadixTree, Slot};
    ///
    /// let mut tree: RadixTree<u32> = RadixTree::new(32);
    /// let h = tree.insert(&RadixPrefix::v4(Ipv4Addr::new(10, 0, 0, 0), 8)?);
    /// tree.set_data(h, Slot::V4, 1)?;
    /// assert_eq!(tree.data(h, Slot::V4), Some(&1));
    /// # Ok::<(), radix_prefix::RadixError>(())
    /// ```
    pub fn insert(&mut self, prefix: &RadixPrefix) -> NodeHandle {
        self.insert_ref(SharedPrefix::new(prefix.clone()), None)
    }

    /// Insert a prefix that already lives behind a [`SharedPrefix`]
    /// handle. The tree retains the same allocation instead of copying, so
    /// the prefix can be shared across trees and with the caller.
    pub fn insert_shared(&mut self, prefix: SharedPrefix) -> NodeHandle {
        self.insert_ref(prefix, None)
    }

    /// Longest-prefix match. Returns the node of the most specific stored
    /// prefix that contains `query` and is visible to the query's payload
    /// slot (so IPv4 queries never see v6-only entries, and vice versa).
    /// A zero-length prefix matches everything of its slot.
    ///
    /// Panics if the query's prefix length exceeds the tree's `maxbits`.
    ///
    /// ```
    /// use std::net::Ipv4Addr;
    /// use radix_prefix::{RadixPrefix, RadixTree, Slot};
    ///
    /// let mut tree: RadixTree<&str> = RadixTree::new(32);
    /// let h8 = tree.insert(&RadixPrefix::v4(Ipv4Addr::new(10, 0, 0, 0), 8)?);
    /// tree.set_data(h8, Slot::V4, "corp")?;
    /// let h16 = tree.insert(&RadixPrefix::v4(Ipv4Addr::new(10, 1, 0, 0), 16)?);
    /// tree.set_data(h16, Slot::V4, "lab")?;
    ///
    /// let q = RadixPrefix::v4(Ipv4Addr::new(10, 1, 2, 3), 32)?;
    /// assert_eq!(tree.search(&q), Some(h16));
    /// assert_eq!(tree.search_data(&q), Some(&"lab"));
    /// # Ok::<(), radix_prefix::RadixError>(())
    /// ```
    pub fn search(&self, query: &RadixPrefix) -> Option<NodeHandle> {
        let slot = Slot::of_query(query).index();
        let mut stack = self.candidates(query);
        while let Some(idx) = stack.pop() {
            let node = &self.table[idx];
            if query.bitlen() < node.bit {
                continue;
            }
            let p = node
                .prefix
                .as_ref()
                .expect("only prefixed nodes are candidates");
            if node.node_num[slot] != -1 && addr_eq_masked(p.addr(), query.addr(), p.bitlen()) {
                return Some(self.handle(idx));
            }
        }
        None
    }

    /// Address-match-list lookup: among all stored prefixes containing
    /// `query`, return the one inserted first (lowest insertion number for
    /// the query's slot), regardless of specificity. This is the selection
    /// rule ordered ACLs need, and the reason insertion numbers exist.
    pub fn search_earliest(&self, query: &RadixPrefix) -> Option<NodeHandle> {
        let slot = Slot::of_query(query).index();
        let mut stack = self.candidates(query);
        let mut best: Option<usize> = None;
        let mut best_num = 0i32;
        while let Some(idx) = stack.pop() {
            let node = &self.table[idx];
            if query.bitlen() < node.bit {
                continue;
            }
            let p = node
                .prefix
                .as_ref()
                .expect("only prefixed nodes are candidates");
            if node.node_num[slot] != -1 && addr_eq_masked(p.addr(), query.addr(), p.bitlen()) {
                let num = node.node_num[slot];
                if best.is_none() || best_num > num {
                    best = Some(idx);
                    best_num = num;
                }
            }
        }
        best.map(|idx| self.handle(idx))
    }

    /// Longest-prefix match, returning the payload in the query's slot
    /// directly. `None` if nothing matches or the matching node carries no
    /// data in that slot.
    pub fn search_data(&self, query: &RadixPrefix) -> Option<&T> {
        let handle = self.search(query)?;
        self.data(handle, Slot::of_query(query))
    }

    /// The prefix stored at `handle`, or `None` if the handle is stale.
    pub fn prefix(&self, handle: NodeHandle) -> Option<&RadixPrefix> {
        self.checked_idx(handle)
            .and_then(|idx| self.table[idx].prefix.as_deref())
    }

    /// The payload in `slot` at `handle`, or `None` if the slot is empty
    /// or the handle is stale.
    pub fn data(&self, handle: NodeHandle, slot: Slot) -> Option<&T> {
        self.checked_idx(handle)
            .and_then(|idx| self.table[idx].data[slot.index()].as_ref())
    }

    /// Mutable access to the payload in `slot` at `handle`.
    pub fn data_mut(&mut self, handle: NodeHandle, slot: Slot) -> Option<&mut T> {
        let idx = self.checked_idx(handle)?;
        self.table[idx].data[slot.index()].as_mut()
    }

    /// Store `value` in `slot` at `handle`, returning the previous payload
    /// of that slot.
    pub fn set_data(
        &mut self,
        handle: NodeHandle,
        slot: Slot,
        value: T,
    ) -> Result<Option<T>, RadixError> {
        let idx = self.checked_idx(handle).ok_or(RadixError::InvalidHandle)?;
        Ok(self.table[idx].data[slot.index()].replace(value))
    }

    /// Take the payload out of `slot` at `handle`, leaving the slot
    /// registered (its insertion number is kept).
    pub fn take_data(&mut self, handle: NodeHandle, slot: Slot) -> Result<Option<T>, RadixError> {
        let idx = self.checked_idx(handle).ok_or(RadixError::InvalidHandle)?;
        Ok(self.table[idx].data[slot.index()].take())
    }

    /// The insertion number of `slot` at `handle`, if the slot is in use.
    pub fn node_num(&self, handle: NodeHandle, slot: Slot) -> Option<i32> {
        let idx = self.checked_idx(handle)?;
        let num = self.table[idx].node_num[slot.index()];
        (num != -1).then_some(num)
    }

    /// Remove the prefix at `handle` and return its payload slots.
    ///
    /// A node that still branches for other entries stays in place as pure
    /// glue; a leaf is unlinked (collapsing a now-pointless glue parent);
    /// a node with one child is replaced by it. In every case the handle
    /// goes stale: removing twice yields [`RadixError::InvalidHandle`].
    ///
    /// ```
    /// use std::net::Ipv4Addr;
    /// use radix_prefix::{RadixError, RadixPrefix, RadixTree, Slot};
    ///
    /// let mut tree: RadixTree<u32> = RadixTree::new(32);
    /// let h = tree.insert(&RadixPrefix::v4(Ipv4Addr::new(10, 1, 0, 0), 16)?);
    /// tree.set_data(h, Slot::V4, 7)?;
    /// assert_eq!(tree.remove(h)?[Slot::V4.index()], Some(7));
    /// assert_eq!(tree.remove(h), Err(RadixError::InvalidHandle));
    /// # Ok::<(), radix_prefix::RadixError>(())
    /// ```
    pub fn remove(&mut self, handle: NodeHandle) -> Result<[Option<T>; SLOT_COUNT], RadixError> {
        let idx = self.checked_idx(handle).ok_or(RadixError::InvalidHandle)?;
        let has_left = self.table[idx].left.is_some();
        let has_right = self.table[idx].right.is_some();

        if has_left && has_right {
            // still a branching point for other entries: demote to glue
            let node = &mut self.table[idx];
            node.prefix = None;
            node.node_num = [-1; SLOT_COUNT];
            node.gen = node.gen.wrapping_add(1);
            let data = std::mem::replace(&mut node.data, Node::empty_data());
            self.len -= 1;
            trace!("remove: demoted branching node to glue");
            return Ok(data);
        }

        if !has_left && !has_right {
            let parent = self.table[idx].parent;
            let data = std::mem::replace(&mut self.table[idx].data, Node::empty_data());
            self.free_node(idx);
            self.len -= 1;
            let Some(par) = parent else {
                self.root = None;
                return Ok(data);
            };
            let par_right = self.table[par].right == Some(idx);
            let sibling = if par_right {
                self.table[par].right = None;
                self.table[par].left
            } else {
                self.table[par].left = None;
                self.table[par].right
            };
            if self.table[par].prefix.is_some() {
                return Ok(data);
            }
            // the parent is glue serving no purpose now: collapse it
            let sib = sibling.expect("glue node has two children");
            let grand = self.table[par].parent;
            self.table[sib].parent = grand;
            match grand {
                None => self.root = Some(sib),
                Some(g) => self.replace_child(g, par, sib),
            }
            self.free_node(par);
            trace!("remove: leaf removed, glue parent collapsed");
            return Ok(data);
        }

        // exactly one child: splice it up into this node's place
        let child = self.table[idx]
            .left
            .or(self.table[idx].right)
            .expect("one child is present");
        let parent = self.table[idx].parent;
        let data = std::mem::replace(&mut self.table[idx].data, Node::empty_data());
        self.table[child].parent = parent;
        match parent {
            None => self.root = Some(child),
            Some(p) => self.replace_child(p, idx, child),
        }
        self.free_node(idx);
        self.len -= 1;
        trace!("remove: spliced single child up");
        Ok(data)
    }

    /// Visit every stored prefix with its payload slots. Glue nodes are
    /// skipped. The visiting order is unspecified; do not mutate the tree
    /// from the callback (the borrow checker enforces this).
    pub fn process<F>(&self, mut visit: F)
    where
        F: FnMut(&RadixPrefix, &[Option<T>; SLOT_COUNT]),
    {
        for (prefix, data) in self.iter() {
            visit(prefix, data);
        }
    }

    /// Iterate over all stored prefixes and their payload slots, in
    /// unspecified order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            tree: self,
            stack: self.root.into_iter().collect(),
        }
    }

    /// Tear the tree down, handing every stored prefix and its payload
    /// slots to `destroy`. Uses an explicit stack bounded by the tree
    /// depth, never recursion.
    ///
    /// Panics if a glue node turns out to carry payload or if the
    /// live-node counter does not reach zero, both of which mean the tree
    /// was corrupted earlier.
    pub fn clear_with<F>(&mut self, mut destroy: F)
    where
        F: FnMut(&RadixPrefix, [Option<T>; SLOT_COUNT]),
    {
        if let Some(root) = self.root.take() {
            let mut stack: Vec<usize> = Vec::with_capacity(self.maxbits as usize + 1);
            let mut cur = Some(root);
            while let Some(idx) = cur {
                let left = self.table[idx].left;
                let right = self.table[idx].right;
                let prefix = self.table[idx].prefix.take();
                let data = std::mem::replace(&mut self.table[idx].data, Node::empty_data());
                match prefix {
                    Some(p) => destroy(&p, data),
                    None => assert!(
                        data.iter().all(Option::is_none),
                        "glue node carries payload"
                    ),
                }
                self.free_node(idx);
                cur = match (left, right) {
                    (Some(l), Some(r)) => {
                        stack.push(r);
                        Some(l)
                    }
                    (Some(l), None) => Some(l),
                    (None, Some(r)) => Some(r),
                    (None, None) => stack.pop(),
                };
            }
        }
        assert_eq!(self.num_active_node, 0, "node leak detected on teardown");
        self.len = 0;
        debug!("tree cleared");
    }

    /// Remove every entry, dropping all payloads.
    pub fn clear(&mut self) {
        self.clear_with(|_, _| {});
    }

    /// Splice every prefix of `other` into this tree, sharing the prefix
    /// allocations and cloning the payloads. Insertion numbers are
    /// renumbered by this tree's current counter value, so everything
    /// merged sorts after everything already present, in its original
    /// relative order; afterwards the counter jumps past the merged range.
    ///
    /// Where a merged prefix collides with an entry of this tree, slots
    /// already assigned here keep their number and payload; only slots
    /// still unused take the source's.
    ///
    /// Panics if `other` allows longer prefixes than this tree.
    pub fn merge(&mut self, other: &RadixTree<T>)
    where
        T: Clone,
    {
        assert!(
            other.maxbits <= self.maxbits,
            "cannot merge a {}-bit tree into a {}-bit tree",
            other.maxbits,
            self.maxbits
        );
        let offset = self.num_added_node;
        let mut merged = 0usize;
        let mut stack: Vec<usize> = other.root.into_iter().collect();
        while let Some(idx) = stack.pop() {
            let node = &other.table[idx];
            if let Some(right) = node.right {
                stack.push(right);
            }
            if let Some(left) = node.left {
                stack.push(left);
            }
            if let Some(prefix) = &node.prefix {
                let mut node_num = [-1i32; SLOT_COUNT];
                for (i, num) in node.node_num.iter().enumerate() {
                    if *num != -1 {
                        node_num[i] = offset + *num;
                    }
                }
                self.insert_ref(
                    prefix.clone(),
                    Some(MergePayload {
                        node_num,
                        data: node.data.clone(),
                    }),
                );
                merged += 1;
            }
        }
        self.num_added_node = offset + other.num_added_node;
        debug!(
            "merged {merged} prefixes, insertion counter now {}",
            self.num_added_node
        );
    }
}

/// Private function implementations
impl<T> RadixTree<T> {
    /// Insert `prefix`, optionally carrying a pre-renumbered payload from a
    /// merge. This is the one place the tree structure grows.
    fn insert_ref(&mut self, prefix: SharedPrefix, merge: Option<MergePayload<T>>) -> NodeHandle {
        let bitlen = prefix.bitlen();
        assert!(
            bitlen <= self.maxbits,
            "prefix length {bitlen} exceeds the tree bound {}",
            self.maxbits
        );

        let Some(root) = self.root else {
            let idx = self.new_node(bitlen, Some(prefix.clone()));
            self.root = Some(idx);
            self.len += 1;
            self.apply_payload(idx, &prefix, merge);
            trace!("insert {prefix:?}: new root");
            return self.handle(idx);
        };

        let addr = *prefix.addr();

        // structural descent. glue nodes always carry two children, so
        // this stops either at a prefixed node covering the new length or
        // where a child link is missing.
        let mut node = root;
        while self.table[node].bit < bitlen || self.table[node].prefix.is_none() {
            let right = self.branch_right(&addr, self.table[node].bit);
            match self.get_child(node, right) {
                Some(next) => node = next,
                None => break,
            }
        }

        let test_addr = *self.table[node]
            .prefix
            .as_ref()
            .expect("descent cannot stop on a glue node")
            .addr();
        let check_bit = self.table[node].bit.min(bitlen);
        let differ_bit = first_differ_bit(&addr, &test_addr, check_bit);

        // the true branching point may sit above where the descent stopped
        while let Some(parent) = self.table[node].parent {
            if self.table[parent].bit < differ_bit {
                break;
            }
            node = parent;
        }

        if differ_bit == bitlen && self.table[node].bit == bitlen {
            if self.table[node].prefix.is_some() {
                trace!("insert {prefix:?}: already present");
                self.apply_payload(node, &prefix, merge);
                return self.handle(node);
            }
            // a glue node sits exactly at this length: promote it
            assert!(
                self.table[node].data.iter().all(Option::is_none)
                    && self.table[node].node_num.iter().all(|n| *n == -1),
                "glue node carries payload"
            );
            self.table[node].prefix = Some(prefix.clone());
            self.len += 1;
            self.apply_payload(node, &prefix, merge);
            trace!("insert {prefix:?}: promoted glue node");
            return self.handle(node);
        }

        let new = self.new_node(bitlen, Some(prefix.clone()));
        self.len += 1;
        self.apply_payload(new, &prefix, merge);

        let node_bit = self.table[node].bit;
        if node_bit == differ_bit {
            // straight extension below the attachment point
            let right = self.branch_right(&addr, node_bit);
            assert!(self.get_child(node, right).is_none());
            self.link_child(node, new, right);
            trace!("insert {prefix:?}: new leaf");
        } else if bitlen == differ_bit {
            // the new prefix covers the whole subtree: splice it in above
            let parent = self.table[node].parent;
            let right = self.branch_right(&test_addr, bitlen);
            self.link_child(new, node, right);
            self.splice_above(node, new, parent);
            trace!("insert {prefix:?}: spliced above existing subtree");
        } else {
            // paths diverge in the middle: fork with a fresh glue node
            let parent = self.table[node].parent;
            let glue = self.new_node(differ_bit, None);
            let right = self.branch_right(&addr, differ_bit);
            self.link_child(glue, new, right);
            self.link_child(glue, node, !right);
            self.splice_above(node, glue, parent);
            trace!("insert {prefix:?}: forked with glue at bit {differ_bit}");
        }
        self.handle(new)
    }

    /// Fill the payload slots of a fresh or re-hit node: either the
    /// renumbered slots of a merged source node, or a fresh insertion
    /// number for the prefix's own slot.
    fn apply_payload(&mut self, idx: usize, prefix: &RadixPrefix, merge: Option<MergePayload<T>>) {
        match merge {
            Some(payload) => {
                let node = &mut self.table[idx];
                for (i, (num, data)) in payload
                    .node_num
                    .into_iter()
                    .zip(payload.data)
                    .enumerate()
                {
                    // slots already claimed in this tree keep their number
                    // and payload; first writer per slot wins
                    if num != -1 && node.node_num[i] == -1 {
                        node.node_num[i] = num;
                        node.data[i] = data;
                    }
                }
            }
            None => self.assign_node_num(idx, prefix),
        }
    }

    /// Give the node a fresh insertion number for the prefix's slot, if
    /// that slot is still unused. An `Unspec` prefix claims every unused
    /// slot with one shared number.
    fn assign_node_num(&mut self, idx: usize, prefix: &RadixPrefix) {
        match Slot::of(prefix) {
            Some(slot) => {
                if self.table[idx].node_num[slot.index()] == -1 {
                    self.num_added_node += 1;
                    self.table[idx].node_num[slot.index()] = self.num_added_node;
                }
            }
            None => {
                if self.table[idx].node_num.iter().any(|n| *n == -1) {
                    self.num_added_node += 1;
                    let num = self.num_added_node;
                    for n in self.table[idx].node_num.iter_mut() {
                        if *n == -1 {
                            *n = num;
                        }
                    }
                }
            }
        }
    }

    /// Descend along the query's bits, collecting every prefixed node on
    /// the way as a match candidate. The stack depth is bounded by the
    /// tree's bit bound.
    fn candidates(&self, query: &RadixPrefix) -> Vec<usize> {
        let bitlen = query.bitlen();
        assert!(
            bitlen <= self.maxbits,
            "query length {bitlen} exceeds the tree bound {}",
            self.maxbits
        );
        let mut stack = Vec::with_capacity(self.maxbits as usize + 1);
        let Some(root) = self.root else {
            return stack;
        };
        let addr = query.addr();
        let mut node = root;
        loop {
            let n = &self.table[node];
            if n.prefix.is_some() {
                stack.push(node);
            }
            if n.bit >= bitlen {
                break;
            }
            let right = bit_set(addr, n.bit);
            match self.get_child(node, right) {
                Some(next) => node = next,
                None => break,
            }
        }
        stack
    }

    /// Turn an arena index into a handle carrying the slot's current
    /// generation.
    fn handle(&self, idx: usize) -> NodeHandle {
        NodeHandle {
            idx,
            gen: self.table[idx].gen,
        }
    }

    /// Resolve a handle, rejecting stale generations and nodes without a
    /// prefix.
    fn checked_idx(&self, handle: NodeHandle) -> Option<usize> {
        let node = self.table.get(handle.idx)?;
        (node.gen == handle.gen && node.prefix.is_some()).then_some(handle.idx)
    }

    #[inline(always)]
    fn branch_right(&self, addr: &[u8; 16], bit: u8) -> bool {
        bit < self.maxbits && bit_set(addr, bit)
    }

    /// Get the child of a node, either to the left or the right.
    #[inline(always)]
    fn get_child(&self, idx: usize, right: bool) -> Option<usize> {
        if right {
            self.table[idx].right
        } else {
            self.table[idx].left
        }
    }

    /// Attach `child` under `parent`, maintaining the back-link.
    #[inline(always)]
    fn link_child(&mut self, parent: usize, child: usize, right: bool) {
        if right {
            self.table[parent].right = Some(child);
        } else {
            self.table[parent].left = Some(child);
        }
        self.table[child].parent = Some(parent);
    }

    /// Redirect whichever child link of `parent` points at `old` to `new`.
    fn replace_child(&mut self, parent: usize, old: usize, new: usize) {
        if self.table[parent].right == Some(old) {
            self.table[parent].right = Some(new);
        } else {
            self.table[parent].left = Some(new);
        }
    }

    /// Put `new` where `old` was: under `parent`'s matching child link, or
    /// at the root.
    fn splice_above(&mut self, old: usize, new: usize, parent: Option<usize>) {
        self.table[new].parent = parent;
        match parent {
            None => self.root = Some(new),
            Some(p) => self.replace_child(p, old, new),
        }
    }

    /// Take a node from the free list or grow the arena.
    fn new_node(&mut self, bit: u8, prefix: Option<SharedPrefix>) -> usize {
        self.num_active_node += 1;
        if let Some(idx) = self.free.pop() {
            let node = &mut self.table[idx];
            node.bit = bit;
            node.prefix = prefix;
            node.parent = None;
            node.left = None;
            node.right = None;
            debug_assert!(node.data.iter().all(Option::is_none));
            debug_assert!(node.node_num.iter().all(|n| *n == -1));
            idx
        } else {
            let idx = self.table.len();
            self.table.push(Node {
                bit,
                prefix,
                parent: None,
                left: None,
                right: None,
                data: Node::empty_data(),
                node_num: [-1; SLOT_COUNT],
                gen: 0,
            });
            idx
        }
    }

    /// Return a node's slot to the free list. Bumping the generation makes
    /// every outstanding handle to it stale.
    fn free_node(&mut self, idx: usize) {
        let node = &mut self.table[idx];
        node.gen = node.gen.wrapping_add(1);
        node.prefix = None;
        node.parent = None;
        node.left = None;
        node.right = None;
        node.data = Node::empty_data();
        node.node_num = [-1; SLOT_COUNT];
        self.free.push(idx);
        self.num_active_node -= 1;
    }
}

impl<T: PartialEq> PartialEq for RadixTree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq> Eq for RadixTree<T> {}

/// One arena slot: a test-bit position, an optional owned prefix (absent
/// on glue nodes), tree links, and the per-slot payload arrays.
#[derive(Clone)]
pub(crate) struct Node<T> {
    pub(crate) bit: u8,
    pub(crate) prefix: Option<SharedPrefix>,
    pub(crate) parent: Option<usize>,
    pub(crate) left: Option<usize>,
    pub(crate) right: Option<usize>,
    pub(crate) data: [Option<T>; SLOT_COUNT],
    pub(crate) node_num: [i32; SLOT_COUNT],
    pub(crate) gen: u32,
}

impl<T> Node<T> {
    fn empty_data() -> [Option<T>; SLOT_COUNT] {
        [None, None, None, None]
    }
}

/// Payload carried through [`RadixTree::merge`]: insertion numbers already
/// renumbered into the destination's range, plus cloned data.
struct MergePayload<T> {
    node_num: [i32; SLOT_COUNT],
    data: [Option<T>; SLOT_COUNT],
}
