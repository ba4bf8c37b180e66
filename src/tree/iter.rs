//! Iteration over the occupied nodes of the tree.

use super::RadixTree;
use crate::prefix::{RadixPrefix, SLOT_COUNT};

/// An iterator over all stored prefixes and their payload slots, in
/// unspecified order. Glue nodes are skipped. See [`RadixTree::iter`].
#[derive(Clone)]
pub struct Iter<'a, T> {
    pub(super) tree: &'a RadixTree<T>,
    pub(super) stack: Vec<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (&'a RadixPrefix, &'a [Option<T>; SLOT_COUNT]);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(cur) = self.stack.pop() {
            let node = &self.tree.table[cur];
            if let Some(right) = node.right {
                self.stack.push(right);
            }
            if let Some(left) = node.left {
                self.stack.push(left);
            }
            if let Some(prefix) = &node.prefix {
                return Some((prefix, &node.data));
            }
        }
        None
    }
}

impl<'a, T> IntoIterator for &'a RadixTree<T> {
    type Item = (&'a RadixPrefix, &'a [Option<T>; SLOT_COUNT]);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
