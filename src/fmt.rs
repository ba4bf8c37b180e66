//! Formatting implementation for the RadixTree

use std::fmt::{Debug, Formatter, Result};

use crate::prefix::{SharedPrefix, SLOT_COUNT};
use crate::tree::RadixTree;

impl<T: Debug> Debug for RadixTree<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.root {
            Some(root) => DebugRadixTree(self, root).fmt(f),
            None => f.debug_map().finish(),
        }
    }
}

struct DebugRadixTree<'a, T>(&'a RadixTree<T>, usize);

impl<T: Debug> Debug for DebugRadixTree<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let tree = self.0;
        let idx = self.1;
        let node = &tree.table[idx];
        let key = DebugKey {
            bit: node.bit,
            prefix: &node.prefix,
        };
        let slots = DebugSlots(&node.data);
        match (node.prefix.is_some(), node.left, node.right) {
            (false, None, None) => key.fmt(f),
            (false, None, Some(child)) | (false, Some(child), None) => {
                f.debug_map().entry(&key, &Self(tree, child)).finish()
            }
            (false, Some(left), Some(right)) => f
                .debug_map()
                .entry(&key, &(Self(tree, left), Self(tree, right)))
                .finish(),
            (true, None, None) => f.debug_map().entry(&key, &slots).finish(),
            (true, None, Some(child)) | (true, Some(child), None) => f
                .debug_map()
                .entry(&key, &(slots, Self(tree, child)))
                .finish(),
            (true, Some(left), Some(right)) => f
                .debug_map()
                .entry(&key, &(slots, Self(tree, left), Self(tree, right)))
                .finish(),
        }
    }
}

/// A prefixed node shows as its prefix, a glue node as its test-bit
/// position.
struct DebugKey<'a> {
    bit: u8,
    prefix: &'a Option<SharedPrefix>,
}

impl Debug for DebugKey<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.prefix {
            Some(p) => p.fmt(f),
            None => write!(f, "glue/{}", self.bit),
        }
    }
}

/// Only the occupied payload slots, keyed by slot index.
struct DebugSlots<'a, T>(&'a [Option<T>; SLOT_COUNT]);

impl<T: Debug> Debug for DebugSlots<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let mut map = f.debug_map();
        for (slot, value) in self.0.iter().enumerate() {
            if let Some(value) = value {
                map.entry(&slot, value);
            }
        }
        map.finish()
    }
}
