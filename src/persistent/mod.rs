//! Persistent (immutable) rope.
//!
//! This module provides [`PersistentRope`], a copy-on-write sequence
//! container built from short leaf buffers joined by shared internal nodes:
//!
//! - edits rebuild only the path from the root to the edited leaves
//! - earlier versions stay valid and keep their contents
//! - depth is restored on demand by [`PersistentRope::rebalance`]
//!
//! # Structural Sharing
//!
//! Every operation that changes the elements returns a new rope. The new
//! rope reuses every subtree the edit did not reach:
//!
//! ```rust
//! use persistent_rope::persistent::PersistentRope;
//!
//! let rope: PersistentRope<i32> = (0..10_000).collect();
//! let edited = rope.insert(5_000, &[-1]).remove(0..10);
//!
//! assert_eq!(rope.len(), 10_000);   // Original unchanged
//! assert_eq!(edited.len(), 9_991);  // New version
//! assert_eq!(edited.get(4_990), Some(&-1));
//! ```
//!
//! # Rebalancing
//!
//! Edits that keep landing in the same place deepen one side of the tree.
//! Rebalancing rebuilds the lopsided subtrees without changing the elements:
//!
//! ```rust
//! use persistent_rope::persistent::PersistentRope;
//! use persistent_rope::settings::RopeSettings;
//!
//! let settings = RopeSettings::new(4, 2, 1.001).unwrap();
//! let mut rope = PersistentRope::with_settings(settings);
//! for _ in 0..1000 {
//!     rope = rope.insert(0, &[0, 1, 2, 3, 4, 5, 6, 7]);
//! }
//! assert!(rope.depth() >= 10);
//!
//! rope.rebalance();
//! assert!(rope.depth() <= 13);
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod node;
mod rebalance;
mod rope;

pub use rope::PersistentRope;
pub use rope::PersistentRopeChunks;
pub use rope::PersistentRopeIntoIterator;
pub use rope::PersistentRopeIterator;

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(PersistentRope<i32>: Send, Sync);

#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(PersistentRope<i32>: Send, Sync);
