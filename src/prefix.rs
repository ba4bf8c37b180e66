//! The prefix value object stored in the tree, and the per-family data slots.

use std::fmt::{Debug, Formatter};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use crate::RadixError;

/// Number of per-family payload slots on every node: v4, v6, and the ECS
/// variant of each.
pub const SLOT_COUNT: usize = 4;

/// Address family tag of a [`RadixPrefix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// IPv4, up to 32 bits of address.
    Ipv4,
    /// IPv6, up to 128 bits of address.
    Ipv6,
    /// The "any" family. Stored v4-shaped, and claims all four payload
    /// slots at once when inserted (see [`crate::RadixTree::insert`]).
    Unspec,
}

impl Family {
    /// The largest prefix length this family allows.
    pub fn max_bitlen(self) -> u8 {
        match self {
            Family::Ipv4 | Family::Unspec => 32,
            Family::Ipv6 => 128,
        }
    }

    /// The prefix length assumed when the caller does not supply one.
    fn default_bitlen(self) -> u8 {
        self.max_bitlen()
    }
}

/// Index of a payload slot on a node. Each node carries one data value and
/// one insertion-order number per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// IPv4 without the ECS flag.
    V4 = 0,
    /// IPv6 without the ECS flag.
    V6 = 1,
    /// IPv4 with the ECS flag.
    V4Ecs = 2,
    /// IPv6 with the ECS flag.
    V6Ecs = 3,
}

impl Slot {
    /// All slots, in index order.
    pub const ALL: [Slot; SLOT_COUNT] = [Slot::V4, Slot::V6, Slot::V4Ecs, Slot::V6Ecs];

    /// Position of this slot in a node's payload arrays.
    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The slot a prefix writes to on insert, or `None` for
    /// [`Family::Unspec`], which writes all slots.
    pub fn of(prefix: &RadixPrefix) -> Option<Slot> {
        match (prefix.family, prefix.ecs) {
            (Family::Unspec, _) => None,
            (Family::Ipv4, false) => Some(Slot::V4),
            (Family::Ipv4, true) => Some(Slot::V4Ecs),
            (Family::Ipv6, false) => Some(Slot::V6),
            (Family::Ipv6, true) => Some(Slot::V6Ecs),
        }
    }

    /// The slot a query reads from. An `Unspec` query reads the v4 slot;
    /// the wildcard family is v4-shaped throughout.
    pub fn of_query(prefix: &RadixPrefix) -> Slot {
        Slot::of(prefix).unwrap_or(if prefix.ecs { Slot::V4Ecs } else { Slot::V4 })
    }
}

/// A shared, immutable prefix. Cloning the handle retains the allocation;
/// dropping the last handle releases it.
pub type SharedPrefix = Arc<RadixPrefix>;

/// A network prefix: an address family, a prefix length, and up to 128 bits
/// of address data.
///
/// The value is immutable after construction. Only the first
/// `ceil(bitlen / 8)` bytes of the supplied address are copied; trailing
/// bits inside the last byte are kept as given and masked at comparison
/// time, so two prefixes describing the same range but built from different
/// host addresses compare unequal under `==`.
///
/// The `ecs` flag is opaque metadata: the tree never interprets it beyond
/// selecting the payload [`Slot`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RadixPrefix {
    family: Family,
    bitlen: u8,
    ecs: bool,
    addr: [u8; 16],
}

impl RadixPrefix {
    /// Create a prefix from raw address bytes in network byte order.
    ///
    /// When `bitlen` is `None`, the family default applies: 32 for
    /// [`Family::Ipv4`] and [`Family::Unspec`] (the wildcard family is
    /// v4-shaped), 128 for [`Family::Ipv6`].
    ///
    /// ```
    /// use radix_prefix::{Family, RadixPrefix};
    /// let p = RadixPrefix::new(Family::Ipv4, &[10, 1, 0, 0], Some(16))?;
    /// assert_eq!(p.bitlen(), 16);
    /// assert!(RadixPrefix::new(Family::Ipv4, &[10, 1, 0, 0], Some(33)).is_err());
    /// # Ok::<(), radix_prefix::RadixError>(())
    /// ```
    pub fn new(family: Family, addr: &[u8], bitlen: Option<u8>) -> Result<Self, RadixError> {
        let bitlen = bitlen.unwrap_or_else(|| family.default_bitlen());
        if bitlen > family.max_bitlen() {
            return Err(RadixError::PrefixLength { family, bitlen });
        }
        let nbytes = (bitlen as usize + 7) / 8;
        if addr.len() < nbytes {
            return Err(RadixError::AddressLength {
                expected: nbytes,
                got: addr.len(),
            });
        }
        let mut buf = [0u8; 16];
        buf[..nbytes].copy_from_slice(&addr[..nbytes]);
        Ok(Self {
            family,
            bitlen,
            ecs: false,
            addr: buf,
        })
    }

    /// Create an IPv4 prefix.
    pub fn v4(addr: Ipv4Addr, bitlen: u8) -> Result<Self, RadixError> {
        Self::new(Family::Ipv4, &addr.octets(), Some(bitlen))
    }

    /// Create an IPv6 prefix.
    pub fn v6(addr: Ipv6Addr, bitlen: u8) -> Result<Self, RadixError> {
        Self::new(Family::Ipv6, &addr.octets(), Some(bitlen))
    }

    /// Create the zero-length wildcard prefix. Inserted, it claims every
    /// payload slot and matches any query as the fallback of last resort.
    pub fn any() -> Self {
        Self {
            family: Family::Unspec,
            bitlen: 0,
            ecs: false,
            addr: [0u8; 16],
        }
    }

    /// Set the ECS metadata flag, moving the prefix to the ECS slot of its
    /// family.
    pub fn with_ecs(mut self, ecs: bool) -> Self {
        self.ecs = ecs;
        self
    }

    /// The address family.
    pub fn family(&self) -> Family {
        self.family
    }

    /// The prefix length in bits.
    pub fn bitlen(&self) -> u8 {
        self.bitlen
    }

    /// The ECS metadata flag.
    pub fn ecs(&self) -> bool {
        self.ecs
    }

    /// The raw address bytes, zero-padded to 16 bytes.
    pub fn addr(&self) -> &[u8; 16] {
        &self.addr
    }

    /// Check if a specific bit is set (counted from the left, where 0 is
    /// the first bit of the first byte).
    ///
    /// Panics if `bit >= 128`, past the last stored address byte.
    pub fn is_bit_set(&self, bit: u8) -> bool {
        assert!(bit < 128, "bit index {bit} out of range for a 128-bit address");
        bit_set(&self.addr, bit)
    }

    /// Move the prefix behind a shared handle.
    pub fn shared(self) -> SharedPrefix {
        Arc::new(self)
    }
}

impl Debug for RadixPrefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let ecs = if self.ecs { "+ecs" } else { "" };
        match self.family {
            Family::Ipv4 => {
                let a = Ipv4Addr::new(self.addr[0], self.addr[1], self.addr[2], self.addr[3]);
                write!(f, "{}/{}{}", a, self.bitlen, ecs)
            }
            Family::Ipv6 => write!(f, "{}/{}{}", Ipv6Addr::from(self.addr), self.bitlen, ecs),
            Family::Unspec => write!(f, "any/{}{}", self.bitlen, ecs),
        }
    }
}

#[cfg(feature = "ipnet")]
impl From<ipnet::Ipv4Net> for RadixPrefix {
    fn from(net: ipnet::Ipv4Net) -> Self {
        let mut addr = [0u8; 16];
        addr[..4].copy_from_slice(&net.addr().octets());
        Self {
            family: Family::Ipv4,
            bitlen: net.prefix_len(),
            ecs: false,
            addr,
        }
    }
}

#[cfg(feature = "ipnet")]
impl From<ipnet::Ipv6Net> for RadixPrefix {
    fn from(net: ipnet::Ipv6Net) -> Self {
        Self {
            family: Family::Ipv6,
            bitlen: net.prefix_len(),
            ecs: false,
            addr: net.addr().octets(),
        }
    }
}

#[cfg(feature = "ipnet")]
impl From<ipnet::IpNet> for RadixPrefix {
    fn from(net: ipnet::IpNet) -> Self {
        match net {
            ipnet::IpNet::V4(n) => n.into(),
            ipnet::IpNet::V6(n) => n.into(),
        }
    }
}

/// Test the bit at `bit` (counted from the left) in a 16-byte address.
#[inline(always)]
pub(crate) fn bit_set(addr: &[u8; 16], bit: u8) -> bool {
    addr[(bit >> 3) as usize] & (0x80 >> (bit & 0x07)) != 0
}

/// Compare two addresses up to `mask` bits. A zero mask always matches.
pub(crate) fn addr_eq_masked(a: &[u8; 16], b: &[u8; 16], mask: u8) -> bool {
    let n = (mask / 8) as usize;
    if a[..n] != b[..n] {
        return false;
    }
    let rem = mask % 8;
    if rem == 0 {
        return true;
    }
    let m = 0xffu8 << (8 - rem);
    a[n] & m == b[n] & m
}

/// First bit position at which `a` and `b` differ, checking at most
/// `check_bit` bits.
pub(crate) fn first_differ_bit(a: &[u8; 16], b: &[u8; 16], check_bit: u8) -> u8 {
    let mut i = 0usize;
    while i * 8 < check_bit as usize {
        let r = a[i] ^ b[i];
        if r != 0 {
            let differ = (i * 8) as u8 + r.leading_zeros() as u8;
            return differ.min(check_bit);
        }
        i += 1;
    }
    check_bit
}
