//! Tree nodes of the persistent rope and the algorithms that rebuild them.
//!
//! A node is either a leaf holding a contiguous buffer of elements or an
//! internal node joining two shared children. Nodes are never modified
//! after construction: every edit allocates new nodes along the edited path
//! and links them to the untouched siblings of the old tree.
//!
//! # Shape Rules
//!
//! After each operation the following hold for the node it produced:
//!
//! - a leaf holds at most `split_length` elements; a longer buffer is split
//!   at its midpoint, and the halves are split again until they fit
//! - an internal node rebuilt by a removal and shorter than `join_length` is
//!   flattened into a single leaf
//!
//! Adjustment only looks at the node being rebuilt. A joined leaf is not
//! re-checked and the parents of a split leaf are not re-checked, so a long
//! run of edits can leave a tree that is valid at every node yet deeper than
//! necessary. Restoring a depth bound is the job of the rebalancer.
//!
//! ```text
//! split_length = 4
//!
//! [0 1 2 3 4 5 6 7]          Internal(8)
//!                      =>     /        \
//!                      Leaf[0 1 2 3]  Leaf[4 5 6 7]
//! ```

use smallvec::SmallVec;

use super::ReferenceCounter;
use crate::settings::RopeSettings;

/// Inline capacity of the traversal stacks; deeper trees spill to the heap.
pub(crate) const STACK_CAPACITY: usize = 32;

/// A rope node.
pub(crate) enum Node<T> {
    /// A contiguous run of elements.
    Leaf(Vec<T>),
    /// Two shared subtrees and the cached sum of their lengths.
    Internal {
        left: ReferenceCounter<Self>,
        right: ReferenceCounter<Self>,
        length: usize,
    },
}

/// Clamps `start..end`, given in the parent's coordinates, into the local
/// coordinates of a child that begins at `offset` and holds `length` elements.
///
/// Offsets before the child clamp to `0` and offsets past it clamp to
/// `length`, so a range that misses the child entirely becomes empty.
#[inline]
pub(crate) fn bound(start: usize, end: usize, offset: usize, length: usize) -> (usize, usize) {
    (
        start.saturating_sub(offset).min(length),
        end.saturating_sub(offset).min(length),
    )
}

impl<T> Node<T> {
    /// Creates an empty leaf.
    #[inline]
    pub(crate) const fn empty() -> Self {
        Self::Leaf(Vec::new())
    }

    /// Joins two subtrees under a new internal node without adjusting it.
    #[inline]
    pub(crate) fn internal(left: ReferenceCounter<Self>, right: ReferenceCounter<Self>) -> Self {
        let length = left.len() + right.len();
        Self::Internal {
            left,
            right,
            length,
        }
    }

    /// Builds a tree over `elements`, splitting until every leaf fits.
    pub(crate) fn from_elements(mut elements: Vec<T>, settings: &RopeSettings) -> Self {
        if elements.len() <= settings.split_length() {
            return Self::Leaf(elements);
        }
        tracing::trace!(
            length = elements.len(),
            split_length = settings.split_length(),
            "splitting leaf"
        );
        let right = elements.split_off(elements.len() / 2);
        Self::internal(
            ReferenceCounter::new(Self::from_elements(elements, settings)),
            ReferenceCounter::new(Self::from_elements(right, settings)),
        )
    }

    /// Returns the number of elements under this node.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Leaf(elements) => elements.len(),
            Self::Internal { length, .. } => *length,
        }
    }

    /// Returns the element at `index`, or `None` if it is out of bounds.
    pub(crate) fn get(&self, mut index: usize) -> Option<&T> {
        let mut current = self;
        loop {
            match current {
                Self::Leaf(elements) => return elements.get(index),
                Self::Internal { left, right, .. } => {
                    if index < left.len() {
                        current = left.as_ref();
                    } else {
                        index -= left.len();
                        current = right.as_ref();
                    }
                }
            }
        }
    }

    /// Returns the depth of the deepest leaf; a lone leaf has depth 1.
    pub(crate) fn depth(&self) -> usize {
        let mut pending: SmallVec<[(&Self, usize); STACK_CAPACITY]> = SmallVec::new();
        pending.push((self, 1));
        let mut deepest = 0;
        while let Some((node, depth)) = pending.pop() {
            match node {
                Self::Leaf(_) => deepest = deepest.max(depth),
                Self::Internal { left, right, .. } => {
                    pending.push((right.as_ref(), depth + 1));
                    pending.push((left.as_ref(), depth + 1));
                }
            }
        }
        deepest
    }

    /// Calls `visit` with the part of every leaf that lies in `start..end`,
    /// left to right.
    ///
    /// Internal nodes clamp the range into each child with [`bound`]; a child
    /// whose clamped range is empty is skipped without being descended into.
    pub(crate) fn visit_range<F>(&self, start: usize, end: usize, mut visit: F)
    where
        F: FnMut(&[T]),
    {
        let mut pending: SmallVec<[(&Self, usize, usize); STACK_CAPACITY]> = SmallVec::new();
        pending.push((self, start, end));
        while let Some((node, start, end)) = pending.pop() {
            if start == end {
                continue;
            }
            match node {
                Self::Leaf(elements) => visit(&elements[start..end]),
                Self::Internal { left, right, .. } => {
                    let (left_start, left_end) = bound(start, end, 0, left.len());
                    let (right_start, right_end) = bound(start, end, left.len(), right.len());
                    pending.push((right.as_ref(), right_start, right_end));
                    pending.push((left.as_ref(), left_start, left_end));
                }
            }
        }
    }

    /// Returns an iterator over the non-empty leaf buffers, in order.
    pub(crate) fn chunks(&self) -> Chunks<'_, T> {
        Chunks::new(self)
    }
}

impl<T: Clone> Node<T> {
    /// Restores the split/join rule for this node only.
    ///
    /// An oversized leaf is rebuilt as a tree of fitting leaves. An internal
    /// node shorter than the join length is flattened into one leaf, and the
    /// new leaf is not checked again. Any other node is returned unchanged.
    pub(crate) fn adjust(mut self, settings: &RopeSettings) -> Self {
        if let Self::Leaf(elements) = &mut self
            && elements.len() > settings.split_length()
        {
            return Self::from_elements(std::mem::take(elements), settings);
        }
        if matches!(self, Self::Internal { .. }) && self.len() < settings.join_length() {
            tracing::trace!(
                length = self.len(),
                join_length = settings.join_length(),
                "joining internal node"
            );
            return Self::Leaf(self.to_vec());
        }
        self
    }

    /// Collects every element under this node into a new `Vec`.
    #[inline]
    pub(crate) fn to_vec(&self) -> Vec<T> {
        self.slice(0, self.len())
    }

    /// Collects the elements in `start..end` into a new `Vec`.
    ///
    /// `start <= end <= self.len()` must hold.
    pub(crate) fn slice(&self, start: usize, end: usize) -> Vec<T> {
        let mut elements = Vec::with_capacity(end - start);
        self.visit_range(start, end, |chunk| elements.extend_from_slice(chunk));
        elements
    }

    /// Clones every element under this node into the front of `destination`.
    ///
    /// `destination` must hold at least `self.len()` elements.
    #[inline]
    pub(crate) fn copy_into(&self, destination: &mut [T]) {
        self.copy_range_into(destination, 0, self.len());
    }

    /// Clones the elements in `start..end` into the front of `destination`.
    ///
    /// `destination` must hold at least `end - start` elements and
    /// `start <= end <= self.len()` must hold.
    pub(crate) fn copy_range_into(&self, destination: &mut [T], start: usize, end: usize) {
        let mut offset = 0;
        self.visit_range(start, end, |chunk| {
            destination[offset..offset + chunk.len()].clone_from_slice(chunk);
            offset += chunk.len();
        });
    }

    /// Returns a tree with `insertion` spliced in before position `index`.
    ///
    /// Only the nodes on the path to the affected leaf are rebuilt; every
    /// sibling along that path is shared with `node`. The rebuilt leaf goes
    /// through [`Node::from_elements`] and may split, but internal nodes on
    /// the path are not adjusted since insertion can only make them longer.
    ///
    /// `index <= node.len()` must hold.
    pub(crate) fn insert(
        node: &ReferenceCounter<Self>,
        index: usize,
        insertion: &[T],
        settings: &RopeSettings,
    ) -> ReferenceCounter<Self> {
        // Siblings of the path, each tagged with whether the path went left.
        let mut siblings: SmallVec<[(&ReferenceCounter<Self>, bool); STACK_CAPACITY]> =
            SmallVec::new();
        let mut current = node;
        let mut local_index = index;

        let mut rebuilt = loop {
            match current.as_ref() {
                Self::Internal { left, right, .. } => {
                    if local_index < left.len() {
                        siblings.push((right, true));
                        current = left;
                    } else {
                        local_index -= left.len();
                        siblings.push((left, false));
                        current = right;
                    }
                }
                Self::Leaf(elements) => {
                    let mut buffer = Vec::with_capacity(elements.len() + insertion.len());
                    buffer.extend_from_slice(&elements[..local_index]);
                    buffer.extend_from_slice(insertion);
                    buffer.extend_from_slice(&elements[local_index..]);
                    break ReferenceCounter::new(Self::from_elements(buffer, settings));
                }
            }
        };

        while let Some((sibling, path_went_left)) = siblings.pop() {
            let sibling = ReferenceCounter::clone(sibling);
            rebuilt = ReferenceCounter::new(if path_went_left {
                Self::internal(rebuilt, sibling)
            } else {
                Self::internal(sibling, rebuilt)
            });
        }
        rebuilt
    }

    /// Returns a tree without the elements in `start..end`.
    ///
    /// An empty range returns `node` itself. Otherwise the range is clamped
    /// into both children with [`bound`], both are rebuilt (a child the range
    /// misses comes back unchanged), and the new internal node is adjusted
    /// since shrinking may take it below the join length.
    ///
    /// The walk is post-order over an explicit stack, so trees deepened by
    /// skewed edits are handled without recursion.
    ///
    /// `start <= end <= node.len()` must hold.
    pub(crate) fn remove(
        node: &ReferenceCounter<Self>,
        start: usize,
        end: usize,
        settings: &RopeSettings,
    ) -> ReferenceCounter<Self> {
        let mut steps: SmallVec<[RemoveStep<'_, T>; STACK_CAPACITY]> = SmallVec::new();
        let mut rebuilt: SmallVec<[ReferenceCounter<Self>; STACK_CAPACITY]> = SmallVec::new();
        steps.push(RemoveStep::Descend(node, start, end));

        while let Some(step) = steps.pop() {
            match step {
                RemoveStep::Descend(current, start, end) if start == end => {
                    rebuilt.push(ReferenceCounter::clone(current));
                }
                RemoveStep::Descend(current, start, end) => match current.as_ref() {
                    Self::Leaf(elements) => {
                        let mut buffer = Vec::with_capacity(elements.len() - (end - start));
                        buffer.extend_from_slice(&elements[..start]);
                        buffer.extend_from_slice(&elements[end..]);
                        rebuilt.push(ReferenceCounter::new(Self::from_elements(buffer, settings)));
                    }
                    Self::Internal { left, right, .. } => {
                        let (left_start, left_end) = bound(start, end, 0, left.len());
                        let (right_start, right_end) = bound(start, end, left.len(), right.len());
                        steps.push(RemoveStep::Join);
                        steps.push(RemoveStep::Descend(right, right_start, right_end));
                        steps.push(RemoveStep::Descend(left, left_start, left_end));
                    }
                },
                RemoveStep::Join => {
                    let (Some(right), Some(left)) = (rebuilt.pop(), rebuilt.pop()) else {
                        unreachable!("both children are rebuilt before their parent");
                    };
                    rebuilt.push(ReferenceCounter::new(
                        Self::internal(left, right).adjust(settings),
                    ));
                }
            }
        }

        rebuilt.pop().unwrap_or_else(|| ReferenceCounter::clone(node))
    }

    /// Joins two trees under a new internal node and adjusts it.
    pub(crate) fn concat(
        left: ReferenceCounter<Self>,
        right: ReferenceCounter<Self>,
        settings: &RopeSettings,
    ) -> ReferenceCounter<Self> {
        ReferenceCounter::new(Self::internal(left, right).adjust(settings))
    }
}

/// Pending work of [`Node::remove`].
enum RemoveStep<'a, T> {
    /// Remove `start..end` from this subtree and push the result.
    Descend(&'a ReferenceCounter<Node<T>>, usize, usize),
    /// Pop the two rebuilt children and push their adjusted parent.
    Join,
}

// =============================================================================
// Drop
// =============================================================================

/// Returns `true` if `child` is owned only through this reference and has
/// children of its own.
fn is_unique_internal<T>(child: &mut ReferenceCounter<Node<T>>) -> bool {
    ReferenceCounter::get_mut(child).is_some_and(|node| matches!(node, Node::Internal { .. }))
}

/// Moves a uniquely owned internal `child` onto `pending`, leaving a clone of
/// `placeholder` in its place.
fn detach<T>(
    child: &mut ReferenceCounter<Node<T>>,
    placeholder: &ReferenceCounter<Node<T>>,
    pending: &mut SmallVec<[ReferenceCounter<Node<T>>; STACK_CAPACITY]>,
) {
    if is_unique_internal(child) {
        pending.push(std::mem::replace(child, ReferenceCounter::clone(placeholder)));
    }
}

/// Tears down uniquely owned subtrees with a worklist.
///
/// A node whose children are shared or leaves drops them directly. Otherwise
/// every uniquely owned internal descendant is unlinked and dropped once its
/// own children have been unlinked, so dropping never recurses more than one
/// level regardless of depth.
impl<T> Drop for Node<T> {
    fn drop(&mut self) {
        let Self::Internal { left, right, .. } = self else {
            return;
        };
        if !is_unique_internal(left) && !is_unique_internal(right) {
            return;
        }

        let placeholder = ReferenceCounter::new(Self::empty());
        let mut pending: SmallVec<[ReferenceCounter<Self>; STACK_CAPACITY]> = SmallVec::new();
        detach(left, &placeholder, &mut pending);
        detach(right, &placeholder, &mut pending);

        while let Some(child) = pending.pop() {
            if let Some(mut child) = ReferenceCounter::into_inner(child)
                && let Self::Internal { left, right, .. } = &mut child
            {
                detach(left, &placeholder, &mut pending);
                detach(right, &placeholder, &mut pending);
            }
        }
    }
}

// =============================================================================
// Chunks Iterator
// =============================================================================

/// An iterator over the non-empty leaf buffers of a tree, left to right.
pub(crate) struct Chunks<'a, T> {
    pending: SmallVec<[&'a Node<T>; STACK_CAPACITY]>,
}

impl<'a, T> Chunks<'a, T> {
    fn new(root: &'a Node<T>) -> Self {
        let mut pending = SmallVec::new();
        pending.push(root);
        Self { pending }
    }
}

impl<'a, T> Iterator for Chunks<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.pending.pop() {
            match node {
                Node::Leaf(elements) if elements.is_empty() => {}
                Node::Leaf(elements) => return Some(elements.as_slice()),
                Node::Internal { left, right, .. } => {
                    self.pending.push(right.as_ref());
                    self.pending.push(left.as_ref());
                }
            }
        }
        None
    }
}

// =============================================================================
// Tests
// =============================================================================
