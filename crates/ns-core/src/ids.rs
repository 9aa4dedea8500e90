//! Strongly typed, zero-cost identifier wrappers.
//!
//! Two kinds of node identifier exist side by side:
//!
//! - [`NodeId`] is the **external** identifier a node carries in its source
//!   data (an OSM node id, a CSV key, a bus-stop number…).  It is what
//!   callers see in accessibility tables and cost matrices.
//! - [`NodeIdx`] / [`EdgeIdx`] are **internal** dense positions into the
//!   network's SoA `Vec`s.  They never leave `ns-spatial` in public results.

use std::fmt;

/// Generate a dense index wrapper around an unsigned integer.
macro_rules! typed_idx {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid index".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized indices are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_idx! {
    /// Dense position of a node inside a `StreetNetwork`.
    pub struct NodeIdx(u32);
}

typed_idx! {
    /// Dense position of a directed edge inside a `StreetNetwork`'s CSR arrays.
    pub struct EdgeIdx(u32);
}

/// External node identifier as carried by the source data.
///
/// OSM ids are 64-bit and may be negative for locally created nodes, hence
/// `i64`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    /// Bare integer, since node ids double as table labels.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NodeId {
    #[inline]
    fn from(v: i64) -> Self {
        NodeId(v)
    }
}
