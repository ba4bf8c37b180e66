//! Error taxonomy for the tree and its prefixes.

use thiserror::Error;

use crate::prefix::Family;

/// Errors returned by the fallible operations of this crate.
///
/// Lookup misses are not errors; they are `Option::None`. Internal
/// consistency violations (a glue node carrying payload, the live-node
/// counter not reaching zero on teardown) are panics, since the tree can no
/// longer be trusted once they occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RadixError {
    /// The prefix length is out of range for the address family.
    #[error("prefix length {bitlen} out of range for {family:?}")]
    PrefixLength {
        /// Family the prefix was constructed for.
        family: Family,
        /// The rejected length.
        bitlen: u8,
    },
    /// The supplied address buffer is shorter than the prefix length
    /// requires.
    #[error("address buffer holds {got} bytes, the prefix length requires {expected}")]
    AddressLength {
        /// Bytes required to cover the prefix length.
        expected: usize,
        /// Bytes supplied.
        got: usize,
    },
    /// The node handle is stale: the node it named has been removed (or
    /// demoted to glue) since the handle was obtained.
    #[error("stale node handle")]
    InvalidHandle,
}
