//! Strongly typed, zero-cost identifier wrappers.
//!
//! IDs are dense, zero-based array indices.  There is no reserved "invalid"
//! value: code that needs an out-of-range marker uses the owning array's
//! length by convention.  The inner integer is `pub` so a decoded record can
//! be built without ceremony, but callers should prefer `.index()` when
//! indexing a `Vec`.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Cast to `usize` for direct use as a slice index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
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

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
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

typed_id! {
    /// Index of a node in the contracted graph (32 bits, unsigned).
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of an entry in the CSR edge array (32 bits, unsigned).
    pub struct EdgeId(u32);
}

/// Edge weight, 32 bits, signed.
///
/// Negative values are allowed while the preprocessing stage composes
/// weights.  Edges relaxed by a shortest-path search must carry a
/// non-negative weight; the type does not enforce this.
pub type Weight = i32;
