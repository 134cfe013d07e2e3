//! Handles: lightweight, typed indices of mesh elements.

use std::fmt;


/// The integer type used to store handle indices.
#[allow(non_camel_case_types)]
pub type hsize = u32;

/// A handle is an index of a mesh element (vertex, face, ...).
///
/// Handles of the mesh data structures in this crate are sequential: the
/// first element added gets index 0, the next one index 1 and so on. This is
/// what makes [`VecMap`][crate::map::VecMap] a good fit for associating data
/// with elements.
pub trait Handle: 'static + Copy + fmt::Debug + Eq + Ord + std::hash::Hash {
    /// Creates a handle from the given index.
    fn new(idx: hsize) -> Self;

    /// Returns the index of this handle.
    fn idx(&self) -> hsize;

    /// Creates a handle from a `usize` index.
    ///
    /// Panics if the value doesn't fit into `hsize`.
    #[inline(always)]
    fn from_usize(raw: usize) -> Self {
        assert!(raw <= hsize::max_value() as usize, "handle index overflow");
        Self::new(raw as hsize)
    }

    /// Returns the index of this handle as `usize`.
    #[inline(always)]
    fn to_usize(&self) -> usize {
        self.idx() as usize
    }
}

macro_rules! make_handle_type {
    ($(#[$attr:meta])* $name:ident = $short:expr;) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(hsize);

        impl Handle for $name {
            #[inline(always)]
            fn new(idx: hsize) -> Self {
                $name(idx)
            }

            #[inline(always)]
            fn idx(&self) -> hsize {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}{}", $short, self.idx())
            }
        }
    }
}

make_handle_type!{
    /// A handle that is associated with a face.
    FaceHandle = "F";
}
make_handle_type!{
    /// A handle that is associated with a full (undirected) edge.
    EdgeHandle = "E";
}
make_handle_type!{
    /// A handle that is associated with a vertex.
    VertexHandle = "V";
}
make_handle_type!{
    /// A handle that is associated with a directed half edge.
    HalfEdgeHandle = "HE";
}

impl HalfEdgeHandle {
    /// Returns the handle of the twin half edge (the half edge right next to
    /// this one, pointing in the opposite direction).
    ///
    /// This relies on twins always being stored next to each other, starting
    /// at an even index. Flipping the last bit yields the twin.
    #[inline(always)]
    pub fn twin(self) -> HalfEdgeHandle {
        Self::new(self.idx() ^ 1)
    }

    /// Returns the full edge this half edge belongs to.
    #[inline(always)]
    pub fn full_edge(self) -> EdgeHandle {
        EdgeHandle::new(self.idx() / 2)
    }
}

impl EdgeHandle {
    /// Returns one of the two half edges of this edge. The other one is its
    /// twin.
    #[inline(always)]
    pub fn half_edge(self) -> HalfEdgeHandle {
        HalfEdgeHandle::new(self.idx() * 2)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twins_and_edges() {
        let he = HalfEdgeHandle::new(6);
        assert_eq!(he.twin(), HalfEdgeHandle::new(7));
        assert_eq!(he.twin().twin(), he);
        assert_eq!(he.full_edge(), EdgeHandle::new(3));
        assert_eq!(he.twin().full_edge(), EdgeHandle::new(3));
        assert_eq!(EdgeHandle::new(3).half_edge(), he);
    }

    #[test]
    fn debug_output() {
        assert_eq!(format!("{:?}", VertexHandle::new(3)), "V3");
        assert_eq!(format!("{:?}", HalfEdgeHandle::from_usize(12)), "HE12");
    }
}
