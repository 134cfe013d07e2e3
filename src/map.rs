//! Property maps: associating data with mesh elements.

use std::{
    fmt,
    iter::FromIterator,
    marker::PhantomData,
    ops::{Index, IndexMut},
    slice,
};

use crate::handle::{hsize, Handle};


/// A property map that uses a simple contiguous vector to store the
/// properties.
///
/// The handle is simply used as an index into the underlying vector. All mesh
/// data structures of this crate produce sequential handles and never remove
/// elements, so this map is *complete* regarding a mesh as soon as one value
/// was pushed per element.
///
/// Inserting at a handle beyond the current length is only allowed for the
/// next handle (`insert(h, _)` with `h.to_usize() == len`); the map never
/// contains holes.
///
/// # Example
///
/// ```
/// use dirfield::{
///     VertexHandle,
///     handle::Handle,
///     map::VecMap,
/// };
///
/// let mut map = VecMap::new();
/// let v0 = map.push("bob");
/// assert_eq!(v0, VertexHandle::new(0));
/// assert_eq!(map.get(v0), Some(&"bob"));
/// assert_eq!(map.get(VertexHandle::new(1)), None);
/// ```
#[derive(Clone, PartialEq)]
pub struct VecMap<H: Handle, T> {
    vec: Vec<T>,
    _dummy: PhantomData<H>,
}

impl<H: Handle, T> VecMap<H, T> {
    /// Creates an empty `VecMap`.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            vec: Vec::with_capacity(cap),
            _dummy: PhantomData,
        }
    }

    /// Appends a value and returns the handle it is stored at.
    pub fn push(&mut self, elem: T) -> H {
        let h = self.next_push_handle();
        self.vec.push(elem);
        h
    }

    /// The handle the next `push` will return.
    pub fn next_push_handle(&self) -> H {
        H::from_usize(self.vec.len())
    }

    /// Sets the value of `handle`, returning the old one if present.
    ///
    /// Panics if `handle` is neither already present nor the next push
    /// handle.
    pub fn insert(&mut self, handle: H, elem: T) -> Option<T> {
        let idx = handle.to_usize();
        if idx < self.vec.len() {
            Some(std::mem::replace(&mut self.vec[idx], elem))
        } else {
            assert_eq!(
                idx,
                self.vec.len(),
                "`VecMap::insert` with handle {:?} would leave a hole",
                handle,
            );
            self.vec.push(elem);
            None
        }
    }

    pub fn get(&self, handle: H) -> Option<&T> {
        self.vec.get(handle.to_usize())
    }

    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        self.vec.get_mut(handle.to_usize())
    }

    pub fn contains_handle(&self, handle: H) -> bool {
        handle.to_usize() < self.vec.len()
    }

    pub fn num_elements(&self) -> hsize {
        self.vec.len() as hsize
    }

    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.vec.reserve(additional);
    }

    pub fn handles(&self) -> Handles<H> {
        Handles {
            range: 0..self.vec.len(),
            _dummy: PhantomData,
        }
    }

    pub fn values(&self) -> slice::Iter<'_, T> {
        self.vec.iter()
    }

    pub fn values_mut(&mut self) -> slice::IterMut<'_, T> {
        self.vec.iter_mut()
    }

    /// Iterates over all `(handle, value)` pairs in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.vec.iter().enumerate().map(|(i, v)| (H::from_usize(i), v))
    }

    /// Returns all values as slice, indexed by `handle.to_usize()`.
    pub fn as_slice(&self) -> &[T] {
        &self.vec
    }

    pub fn into_vec(self) -> Vec<T> {
        self.vec
    }
}

impl<H: Handle, T: Clone> VecMap<H, T> {
    /// Creates a map with `count` copies of `elem` at the handles
    /// `0..count`.
    pub fn from_elem(elem: T, count: usize) -> Self {
        Self {
            vec: vec![elem; count],
            _dummy: PhantomData,
        }
    }
}

impl<H: Handle, T> Default for VecMap<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Handle, T> From<Vec<T>> for VecMap<H, T> {
    fn from(vec: Vec<T>) -> Self {
        Self {
            vec,
            _dummy: PhantomData,
        }
    }
}

impl<H: Handle, T> Index<H> for VecMap<H, T> {
    type Output = T;
    fn index(&self, handle: H) -> &Self::Output {
        match self.get(handle) {
            None => panic!("no property found for handle '{:?}'", handle),
            Some(r) => r,
        }
    }
}

impl<H: Handle, T> IndexMut<H> for VecMap<H, T> {
    fn index_mut(&mut self, handle: H) -> &mut Self::Output {
        match self.get_mut(handle) {
            None => panic!("no property found for handle '{:?}'", handle),
            Some(r) => r,
        }
    }
}

impl<H: Handle, T: fmt::Debug> fmt::Debug for VecMap<H, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<H: Handle, T> Extend<(H, T)> for VecMap<H, T> {
    fn extend<I: IntoIterator<Item = (H, T)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);

        for (handle, value) in iter {
            self.insert(handle, value);
        }
    }
}

impl<H: Handle, T> FromIterator<(H, T)> for VecMap<H, T> {
    fn from_iter<I: IntoIterator<Item = (H, T)>>(iter: I) -> Self {
        let mut out = Self::new();
        out.extend(iter);
        out
    }
}

/// Iterator over the handles of a [`VecMap`].
#[derive(Debug, Clone)]
pub struct Handles<H: Handle> {
    range: std::ops::Range<usize>,
    _dummy: PhantomData<H>,
}

impl<H: Handle> Iterator for Handles<H> {
    type Item = H;
    fn next(&mut self) -> Option<Self::Item> {
        self.range.next().map(H::from_usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl<H: Handle> ExactSizeIterator for Handles<H> {}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::FaceHandle;

    #[test]
    fn push_and_index() {
        let mut map = VecMap::<FaceHandle, _>::new();
        let a = map.push('a');
        let b = map.push('b');

        assert_eq!(a, FaceHandle::new(0));
        assert_eq!(b, FaceHandle::new(1));
        assert_eq!(map[b], 'b');
        assert_eq!(map.num_elements(), 2);
        assert_eq!(map.handles().collect::<Vec<_>>(), vec![a, b]);

        map[a] = 'x';
        assert_eq!(map.values().collect::<String>(), "xb");
    }

    #[test]
    fn insert_next_and_replace() {
        let mut map = VecMap::<FaceHandle, _>::new();
        assert_eq!(map.insert(FaceHandle::new(0), 1), None);
        assert_eq!(map.insert(FaceHandle::new(0), 2), Some(1));
        assert_eq!(map.insert(FaceHandle::new(1), 3), None);
        assert_eq!(map.as_slice(), &[2, 3]);
    }

    #[test]
    #[should_panic]
    fn insert_with_hole_panics() {
        let mut map = VecMap::<FaceHandle, _>::new();
        map.insert(FaceHandle::new(3), 1);
    }

    #[test]
    fn collect_from_pairs() {
        let map: VecMap<FaceHandle, _> = (0..4)
            .map(|i| (FaceHandle::from_usize(i), i * 10))
            .collect();

        assert_eq!(map.get(FaceHandle::new(3)), Some(&30));
        assert!(!map.contains_handle(FaceHandle::new(4)));
    }
}
