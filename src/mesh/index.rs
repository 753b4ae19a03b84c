//! Typed handles into the mesh arenas.
//!
//! Every mesh entity lives in a `Vec` owned by [`HalfEdgeMesh`](super::HalfEdgeMesh)
//! and is addressed by a small integer wrapped in a distinct type, so a vertex
//! handle can never be used to index the face arena. The width of the integer
//! is chosen by the [`MeshIndex`] parameter.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Integer types usable as arena indices.
pub trait MeshIndex: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// The reserved value meaning "no entity" (e.g. the face of a boundary half-edge).
    const INVALID: Self;

    /// Convert from an arena position.
    fn from_usize(v: usize) -> Self;

    /// Convert to an arena position.
    fn to_usize(self) -> usize;

    /// Check if this is a valid (non-sentinel) index.
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

macro_rules! impl_mesh_index {
    ($t:ty) => {
        impl MeshIndex for $t {
            const INVALID: Self = <$t>::MAX;

            #[inline]
            fn from_usize(v: usize) -> Self {
                debug_assert!(
                    v < <$t>::MAX as usize,
                    "arena position {} does not fit in {}",
                    v,
                    stringify!($t)
                );
                v as $t
            }

            #[inline]
            fn to_usize(self) -> usize {
                self as usize
            }
        }
    };
}

impl_mesh_index!(u16);
impl_mesh_index!(u32);
impl_mesh_index!(u64);

/// Handle of a vertex.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// Handle of a directed half-edge.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId<I: MeshIndex = u32>(I);

/// Handle of a triangular face.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

/// Handle of an undirected edge (a pair of twin half-edges).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId<I: MeshIndex = u32>(I);

macro_rules! impl_handle {
    ($name:ident, $tag:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Create a handle from an arena position.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// The null handle.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Arena position of this handle.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Check if this is a valid (non-null) handle.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $tag, self.index())
                } else {
                    write!(f, "{}(INVALID)", $tag)
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl<I: MeshIndex> From<usize> for $name<I> {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_handle!(VertexId, "V");
impl_handle!(HalfEdgeId, "HE");
impl_handle!(FaceId, "F");
impl_handle!(EdgeId, "E");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_roundtrip() {
        let e: EdgeId = EdgeId::new(42);
        assert_eq!(e.index(), 42);
        assert!(e.is_valid());
        assert!(!EdgeId::<u32>::invalid().is_valid());
        assert!(!FaceId::<u32>::default().is_valid());
    }

    #[test]
    fn test_small_handles() {
        let v: VertexId<u16> = VertexId::new(1000);
        assert_eq!(v.index(), 1000);
        assert!(!VertexId::<u16>::invalid().is_valid());
    }

    #[test]
    fn test_debug_format() {
        let f: FaceId = FaceId::new(3);
        assert_eq!(format!("{:?}", f), "F(3)");
        assert_eq!(format!("{:?}", HalfEdgeId::<u32>::invalid()), "HE(INVALID)");
    }
}
