//! Persistent (immutable) rope.
//!
//! This module provides [`PersistentRope`], a sequence container for
//! arbitrary element types that supports cheap localized edits on long
//! sequences without touching earlier versions.
//!
//! # Overview
//!
//! A rope is a binary tree whose leaves hold short contiguous buffers. An
//! edit rebuilds only the leaf it lands in and the internal nodes above it;
//! every other subtree is shared with the rope it was derived from.
//!
//! - O(depth + leaf) `insert`
//! - O(depth + leaf) `remove` of a short range
//! - O(1) `len`
//! - O(n) `to_vec`, O(depth + k) `slice` of k elements
//!
//! The tree keeps leaves short (`split_length`) and collapses small internal
//! nodes (`join_length`) but does not balance itself. Call
//! [`PersistentRope::rebalance`] periodically when edits concentrate in one
//! place.
//!
//! # Examples
//!
//! ```rust
//! use persistent_rope::persistent::PersistentRope;
//! use persistent_rope::settings::RopeSettings;
//!
//! let settings = RopeSettings::new(4, 2, 1.5).unwrap();
//! let rope = PersistentRope::from_vec(vec![0, 1, 2, 3, 4, 5, 6, 7], settings);
//!
//! let inserted = rope.insert(2, &[-1, -2, -3]);
//! assert_eq!(inserted.to_vec(), vec![0, 1, -1, -2, -3, 2, 3, 4, 5, 6, 7]);
//!
//! let removed = rope.remove(1..6);
//! assert_eq!(removed.to_vec(), vec![0, 6, 7]);
//!
//! // The original is untouched
//! assert_eq!(rope.to_vec(), vec![0, 1, 2, 3, 4, 5, 6, 7]);
//! ```
//!
//! # Structural Sharing
//!
//! ```text
//! rope:              Internal(8)
//!                    /         \
//!           Leaf[0 1 2 3]   Leaf[4 5 6 7]
//!                              ^
//! rope.insert(2, ..):          | shared
//!                    Internal(11)
//!                    /         \
//!            Internal(7)    (same leaf)
//!            /       \
//!   Leaf[0 1 -1]  Leaf[-2 -3 2 3]
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::ops::{Bound, RangeBounds};

use super::ReferenceCounter;
use super::node::{Chunks, Node};
use super::rebalance::rebalanced;
use crate::error::RopeError;
use crate::settings::RopeSettings;

/// A persistent (immutable) rope.
///
/// Every edit returns a new rope and leaves `self` untouched. Cloning a rope
/// is O(1): the clone shares the whole tree.
///
/// # Time Complexity
///
/// | Operation    | Complexity                      |
/// |--------------|---------------------------------|
/// | `len`        | O(1)                            |
/// | `get`        | O(depth)                        |
/// | `insert`     | O(depth + `split_length` + m)   |
/// | `remove`     | O(nodes overlapping the range)  |
/// | `slice`      | O(depth + k)                    |
/// | `to_vec`     | O(n)                            |
/// | `rebalance`  | O(size of skewed subtrees)      |
///
/// Depth is logarithmic right after construction or rebalancing and grows
/// with edits concentrated in one place.
///
/// # Examples
///
/// ```rust
/// use persistent_rope::persistent::PersistentRope;
///
/// let rope: PersistentRope<char> = "hello".chars().collect();
/// let greeting = rope.insert(5, &[',', ' ', 'r', 'o', 'p', 'e']);
/// assert_eq!(greeting.iter().collect::<String>(), "hello, rope");
/// assert_eq!(rope.len(), 5);
/// ```
pub struct PersistentRope<T> {
    root: ReferenceCounter<Node<T>>,
    settings: ReferenceCounter<RopeSettings>,
}

/// Resolves `range` against `length` into a half-open `(start, end)` pair.
fn resolve_range<R: RangeBounds<usize>>(
    range: &R,
    length: usize,
) -> Result<(usize, usize), RopeError> {
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&end) => end.saturating_add(1),
        Bound::Excluded(&end) => end,
        Bound::Unbounded => length,
    };
    if start > end {
        return Err(RopeError::InvertedRange { start, end });
    }
    if end > length {
        return Err(RopeError::RangeOutOfBounds { start, end, length });
    }
    Ok((start, end))
}

impl<T> PersistentRope<T> {
    /// Creates an empty rope with [`RopeSettings::DEFAULT`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_rope::persistent::PersistentRope;
    ///
    /// let rope: PersistentRope<u8> = PersistentRope::new();
    /// assert!(rope.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(RopeSettings::DEFAULT)
    }

    /// Creates an empty rope with the given settings.
    #[inline]
    #[must_use]
    pub fn with_settings(settings: RopeSettings) -> Self {
        Self {
            root: ReferenceCounter::new(Node::empty()),
            settings: ReferenceCounter::new(settings),
        }
    }

    /// Builds a rope over `elements`.
    ///
    /// Buffers longer than the split length are halved repeatedly until
    /// every leaf fits, so the result is balanced. A sequence no longer than
    /// the split length becomes a single leaf.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_rope::persistent::PersistentRope;
    /// use persistent_rope::settings::RopeSettings;
    ///
    /// let settings = RopeSettings::new(4, 2, 1.5).unwrap();
    /// assert_eq!(PersistentRope::from_vec(vec![1, 2, 3, 4], settings).depth(), 1);
    /// assert_eq!(PersistentRope::from_vec((0..16).collect(), settings).depth(), 3);
    /// ```
    #[must_use]
    pub fn from_vec(elements: Vec<T>, settings: RopeSettings) -> Self {
        Self {
            root: ReferenceCounter::new(Node::from_elements(elements, &settings)),
            settings: ReferenceCounter::new(settings),
        }
    }

    /// Wraps a rebuilt root, sharing this rope's settings.
    #[inline]
    fn derive(&self, root: ReferenceCounter<Node<T>>) -> Self {
        Self {
            root,
            settings: ReferenceCounter::clone(&self.settings),
        }
    }

    /// Returns the number of elements in the rope.
    ///
    /// # Complexity
    ///
    /// O(1) - lengths are cached in every node
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Returns `true` if the rope contains no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the settings this rope was built with.
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &RopeSettings {
        &self.settings
    }

    /// Returns the depth of the deepest leaf; a single-leaf rope has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Returns a reference to the element at `index`, or `None` if it is out
    /// of bounds.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_rope::persistent::PersistentRope;
    ///
    /// let rope: PersistentRope<i32> = (0..1000).collect();
    /// assert_eq!(rope.get(731), Some(&731));
    /// assert_eq!(rope.get(1000), None);
    /// ```
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.root.get(index)
    }

    /// Returns an iterator over references to the elements, front to back.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> PersistentRopeIterator<'_, T> {
        PersistentRopeIterator {
            chunks: self.root.chunks(),
            current: std::slice::Iter::default(),
            remaining: self.len(),
        }
    }

    /// Returns an iterator over the contiguous buffers of the rope.
    ///
    /// Concatenating the yielded slices gives the rope's elements. Empty
    /// leaves are skipped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_rope::persistent::PersistentRope;
    /// use persistent_rope::settings::RopeSettings;
    ///
    /// let settings = RopeSettings::new(4, 2, 1.5).unwrap();
    /// let rope = PersistentRope::from_vec((0..8).collect(), settings);
    /// let chunks: Vec<&[i32]> = rope.chunks().collect();
    /// assert_eq!(chunks, vec![&[0, 1, 2, 3][..], &[4, 5, 6, 7][..]]);
    /// ```
    #[inline]
    #[must_use]
    pub fn chunks(&self) -> PersistentRopeChunks<'_, T> {
        PersistentRopeChunks {
            inner: self.root.chunks(),
        }
    }
}

impl<T: Clone> PersistentRope<T> {
    /// Builds a rope from a slice, cloning its elements.
    #[must_use]
    pub fn from_slice(elements: &[T], settings: RopeSettings) -> Self {
        Self::from_vec(elements.to_vec(), settings)
    }

    /// Returns a rope with `insertion` spliced in before position `index`.
    ///
    /// `index == self.len()` appends. Only the path from the root to the
    /// affected leaf is rebuilt.
    ///
    /// # Panics
    ///
    /// Panics if `index > self.len()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_rope::persistent::PersistentRope;
    ///
    /// let rope: PersistentRope<i32> = vec![1, 2, 5].into();
    /// let filled = rope.insert(2, &[3, 4]);
    /// assert_eq!(filled.to_vec(), vec![1, 2, 3, 4, 5]);
    /// ```
    #[must_use]
    pub fn insert(&self, index: usize, insertion: &[T]) -> Self {
        self.try_insert(index, insertion)
            .unwrap_or_else(|error| panic!("PersistentRope::insert: {error}"))
    }

    /// Checked version of [`PersistentRope::insert`].
    ///
    /// An empty `insertion` returns a rope sharing this rope's root.
    ///
    /// # Errors
    ///
    /// Returns [`RopeError::IndexOutOfBounds`] if `index > self.len()`.
    pub fn try_insert(&self, index: usize, insertion: &[T]) -> Result<Self, RopeError> {
        let length = self.len();
        if index > length {
            return Err(RopeError::IndexOutOfBounds { index, length });
        }
        if insertion.is_empty() {
            return Ok(self.clone());
        }
        Ok(self.derive(Node::insert(&self.root, index, insertion, &self.settings)))
    }

    /// Returns a rope without the elements in `range`.
    ///
    /// An empty range returns a rope sharing this rope's root.
    ///
    /// # Panics
    ///
    /// Panics if the range starts after it ends or ends past `self.len()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_rope::persistent::PersistentRope;
    ///
    /// let rope: PersistentRope<i32> = (0..8).collect();
    /// assert_eq!(rope.remove(1..6).to_vec(), vec![0, 6, 7]);
    /// assert_eq!(rope.remove(..).len(), 0);
    /// assert_eq!(rope.remove(3..3), rope);
    /// ```
    #[must_use]
    pub fn remove<R: RangeBounds<usize>>(&self, range: R) -> Self {
        self.try_remove(range)
            .unwrap_or_else(|error| panic!("PersistentRope::remove: {error}"))
    }

    /// Checked version of [`PersistentRope::remove`].
    ///
    /// # Errors
    ///
    /// Returns [`RopeError::InvertedRange`] or [`RopeError::RangeOutOfBounds`]
    /// for an invalid range.
    pub fn try_remove<R: RangeBounds<usize>>(&self, range: R) -> Result<Self, RopeError> {
        let (start, end) = resolve_range(&range, self.len())?;
        Ok(self.derive(Node::remove(&self.root, start, end, &self.settings)))
    }

    /// Collects all elements into a new `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.root.to_vec()
    }

    /// Collects the elements in `range` into a new `Vec`.
    ///
    /// # Panics
    ///
    /// Panics if the range starts after it ends or ends past `self.len()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_rope::persistent::PersistentRope;
    ///
    /// let rope: PersistentRope<i32> = (0..100).collect();
    /// assert_eq!(rope.slice(40..44), vec![40, 41, 42, 43]);
    /// assert_eq!(rope.slice(98..), vec![98, 99]);
    /// ```
    #[must_use]
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> Vec<T> {
        self.try_slice(range)
            .unwrap_or_else(|error| panic!("PersistentRope::slice: {error}"))
    }

    /// Checked version of [`PersistentRope::slice`].
    ///
    /// # Errors
    ///
    /// Returns [`RopeError::InvertedRange`] or [`RopeError::RangeOutOfBounds`]
    /// for an invalid range.
    pub fn try_slice<R: RangeBounds<usize>>(&self, range: R) -> Result<Vec<T>, RopeError> {
        let (start, end) = resolve_range(&range, self.len())?;
        Ok(self.root.slice(start, end))
    }

    /// Clones every element into the front of `destination`.
    ///
    /// # Panics
    ///
    /// Panics if `destination` is shorter than the rope.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_rope::persistent::PersistentRope;
    ///
    /// let rope: PersistentRope<i32> = (1..=3).collect();
    /// let mut buffer = [0; 4];
    /// rope.copy_to(&mut buffer);
    /// assert_eq!(buffer, [1, 2, 3, 0]);
    /// ```
    pub fn copy_to(&self, destination: &mut [T]) {
        self.copy_range_to(destination, ..);
    }

    /// Clones the elements in `range` into the front of `destination`.
    ///
    /// # Panics
    ///
    /// Panics if the range is invalid or `destination` cannot hold it.
    pub fn copy_range_to<R: RangeBounds<usize>>(&self, destination: &mut [T], range: R) {
        self.try_copy_range_to(destination, range)
            .unwrap_or_else(|error| panic!("PersistentRope::copy_range_to: {error}"));
    }

    /// Checked version of [`PersistentRope::copy_range_to`].
    ///
    /// Nothing is written when an error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`RopeError::InvertedRange`] or [`RopeError::RangeOutOfBounds`]
    /// for an invalid range, and [`RopeError::DestinationTooShort`] when
    /// `destination` holds fewer than `end - start` elements.
    pub fn try_copy_range_to<R: RangeBounds<usize>>(
        &self,
        destination: &mut [T],
        range: R,
    ) -> Result<(), RopeError> {
        let (start, end) = resolve_range(&range, self.len())?;
        if destination.len() < end - start {
            return Err(RopeError::DestinationTooShort {
                required: end - start,
                actual: destination.len(),
            });
        }
        if (start, end) == (0, self.len()) {
            self.root.copy_into(destination);
        } else {
            self.root.copy_range_into(destination, start, end);
        }
        Ok(())
    }

    /// Returns a rope holding the elements of `self` followed by those of
    /// `other`.
    ///
    /// Both trees are shared under a new root when `other` uses the same
    /// settings; otherwise `other` is rebuilt with this rope's settings.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_rope::persistent::PersistentRope;
    ///
    /// let front: PersistentRope<i32> = (0..500).collect();
    /// let back: PersistentRope<i32> = (500..1000).collect();
    /// let whole = front.append(&back);
    /// assert_eq!(whole.len(), 1000);
    /// assert_eq!(whole.get(500), Some(&500));
    /// ```
    #[must_use]
    pub fn append(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        let other_root = if self.settings == other.settings {
            ReferenceCounter::clone(&other.root)
        } else {
            ReferenceCounter::new(Node::from_elements(other.to_vec(), &self.settings))
        };
        if self.is_empty() {
            return self.derive(other_root);
        }
        self.derive(Node::concat(
            ReferenceCounter::clone(&self.root),
            other_root,
            &self.settings,
        ))
    }

    /// Rebuilds the skewed subtrees of this rope in place.
    ///
    /// Starting at the root, every internal node whose children differ in
    /// length by more than the rebalance ratio is flattened and rebuilt as a
    /// balanced tree; balanced nodes are descended into instead. The elements
    /// do not change.
    ///
    /// Only this handle is updated. Nodes shared with other ropes are never
    /// modified, so ropes this one was derived from, or that were derived
    /// from it, keep their contents and shape.
    ///
    /// # Complexity
    ///
    /// Proportional to the size of the rebuilt subtrees, up to O(n).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_rope::persistent::PersistentRope;
    /// use persistent_rope::settings::RopeSettings;
    ///
    /// let settings = RopeSettings::new(4, 2, 1.5).unwrap();
    /// let mut rope = PersistentRope::with_settings(settings);
    /// for _ in 0..100 {
    ///     rope = rope.insert(0, &[1, 2, 3, 4, 5, 6, 7, 8]);
    /// }
    /// let before = rope.clone();
    ///
    /// rope.rebalance();
    /// assert!(rope.depth() < before.depth());
    /// assert_eq!(rope, before);
    /// ```
    pub fn rebalance(&mut self) {
        self.root = rebalanced(&self.root, &self.settings);
    }

    /// Returns a rebalanced copy of this rope, leaving `self` as it is.
    ///
    /// See [`PersistentRope::rebalance`].
    #[must_use]
    pub fn rebalanced(&self) -> Self {
        self.derive(rebalanced(&self.root, &self.settings))
    }
}

// =============================================================================
// Iterator Implementations
// =============================================================================

/// An iterator over references to elements of a [`PersistentRope`].
pub struct PersistentRopeIterator<'a, T> {
    chunks: Chunks<'a, T>,
    current: std::slice::Iter<'a, T>,
    remaining: usize,
}

impl<'a, T> Iterator for PersistentRopeIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(element) = self.current.next() {
                self.remaining -= 1;
                return Some(element);
            }
            self.current = self.chunks.next()?.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for PersistentRopeIterator<'_, T> {}

impl<T> FusedIterator for PersistentRopeIterator<'_, T> {}

/// An iterator over the leaf buffers of a [`PersistentRope`].
pub struct PersistentRopeChunks<'a, T> {
    inner: Chunks<'a, T>,
}

impl<'a, T> Iterator for PersistentRopeChunks<'a, T> {
    type Item = &'a [T];

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<T> FusedIterator for PersistentRopeChunks<'_, T> {}

/// An owning iterator over elements of a [`PersistentRope`].
///
/// The elements are cloned out of the tree, which may be shared.
pub struct PersistentRopeIntoIterator<T> {
    elements: std::vec::IntoIter<T>,
}

impl<T> Iterator for PersistentRopeIntoIterator<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.elements.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.elements.size_hint()
    }
}

impl<T> DoubleEndedIterator for PersistentRopeIntoIterator<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.elements.next_back()
    }
}

impl<T> ExactSizeIterator for PersistentRopeIntoIterator<T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Clone for PersistentRope<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            root: ReferenceCounter::clone(&self.root),
            settings: ReferenceCounter::clone(&self.settings),
        }
    }
}

impl<T> Default for PersistentRope<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for PersistentRope<T> {
    fn from(elements: Vec<T>) -> Self {
        Self::from_vec(elements, RopeSettings::DEFAULT)
    }
}

impl<T> FromIterator<T> for PersistentRope<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<T>>())
    }
}

impl<T: Clone> IntoIterator for PersistentRope<T> {
    type Item = T;
    type IntoIter = PersistentRopeIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        PersistentRopeIntoIterator {
            elements: self.to_vec().into_iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a PersistentRope<T> {
    type Item = &'a T;
    type IntoIter = PersistentRopeIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ropes compare by their elements only; tree shape and settings are ignored.
impl<T: PartialEq> PartialEq for PersistentRope<T> {
    fn eq(&self, other: &Self) -> bool {
        if ReferenceCounter::ptr_eq(&self.root, &other.root) {
            return true;
        }
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for PersistentRope<T> {}

impl<T: Hash> Hash for PersistentRope<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentRope<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentRope<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        let mut first = true;
        for element in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "]")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for PersistentRope<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentRopeVisitor<T> {
    marker: std::marker::PhantomData<T>,
}

#[cfg(feature = "serde")]
impl<'de, T> serde::de::Visitor<'de> for PersistentRopeVisitor<T>
where
    T: serde::Deserialize<'de>,
{
    type Value = PersistentRope<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        const MAX_PREALLOCATE: usize = 4096;
        let capacity = seq.size_hint().unwrap_or(0).min(MAX_PREALLOCATE);
        let mut elements = Vec::with_capacity(capacity);
        while let Some(element) = seq.next_element()? {
            elements.push(element);
        }
        Ok(PersistentRope::from(elements))
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for PersistentRope<T>
where
    T: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(PersistentRopeVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
