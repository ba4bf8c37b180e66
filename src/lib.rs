//! This crate provides a binary radix (PATRICIA) tree over IP prefixes, in
//! the shape DNS servers use for address-match lists: longest-prefix-match
//! lookups, four independent payload slots per node (IPv4/IPv6, each with
//! and without an EDNS client-subnet flavor), and insertion numbers that
//! remember the order entries went in.
//!
//! The tree stores [`RadixPrefix`] keys. Each distinct prefix occupies one
//! node; the v4 prefix `10.0.0.0/8` and a v6 prefix with the same leading
//! byte pattern share that node but stay invisible to each other's queries
//! through the slot mechanism. Lookups walk at most `maxbits` nodes and
//! never allocate beyond one candidate stack.
//!
//! Handles returned by [`RadixTree::insert`] and [`RadixTree::search`] are
//! generational: they go stale when the node is removed, and stale handles
//! are rejected rather than resolving to a recycled slot.
//!
//! # Examples
//!
//! ```
//! use std::net::Ipv4Addr;
//! use radix_prefix::{RadixPrefix, RadixTree, Slot};
//!
//! let mut tree: RadixTree<&str> = RadixTree::new(32);
//! let corp = tree.insert(&RadixPrefix::v4(Ipv4Addr::new(10, 0, 0, 0), 8)?);
//! tree.set_data(corp, Slot::V4, "corp")?;
//! let lab = tree.insert(&RadixPrefix::v4(Ipv4Addr::new(10, 1, 0, 0), 16)?);
//! tree.set_data(lab, Slot::V4, "lab")?;
//!
//! // the most specific containing prefix wins
//! let q = RadixPrefix::v4(Ipv4Addr::new(10, 1, 2, 3), 32)?;
//! assert_eq!(tree.search_data(&q), Some(&"lab"));
//!
//! // removing it exposes the covering entry again
//! tree.remove(lab)?;
//! assert_eq!(tree.search_data(&q), Some(&"corp"));
//! # Ok::<(), radix_prefix::RadixError>(())
//! ```
//!
//! With the `ipnet` feature (enabled by default), prefixes convert
//! directly from `ipnet` network types:
//!
#![cfg_attr(feature = "ipnet", doc = "```")]
#![cfg_attr(not(feature = "ipnet"), doc = "```ignore")]
//! use radix_prefix::{RadixTree, Slot};
//!
//! let mut tree: RadixTree<u32> = RadixTree::new(128);
//! let net: ipnet::Ipv6Net = "2001:db8::/32".parse().unwrap();
//! let h = tree.insert(&net.into());
//! tree.set_data(h, Slot::V6, 42)?;
//! # Ok::<(), radix_prefix::RadixError>(())
//! ```

#![allow(clippy::collapsible_else_if)]
#![deny(missing_docs)]

mod error;
mod fmt;
mod prefix;
pub mod tree;


#[cfg(test)]
mod fuzzing;

pub use error::RadixError;
pub use prefix::{Family, RadixPrefix, SharedPrefix, Slot, SLOT_COUNT};
pub use tree::{Iter, NodeHandle, RadixTree, RADIX_MAXBITS};
