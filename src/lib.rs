//! # persistent-rope
//!
//! A persistent (immutable, copy-on-write) rope over arbitrary element types.
//!
//! ## Overview
//!
//! [`PersistentRope`](persistent::PersistentRope) stores a sequence as a
//! binary tree of short buffers. Inserting or removing elements rebuilds
//! only the nodes on the path to the edit and shares everything else with
//! the previous version, which stays valid.
//!
//! - **Settings**: split, join and rebalance thresholds ([`settings`])
//! - **Rope**: construction, insertion, removal, slicing and copying ([`persistent`])
//! - **Rebalancing**: on-demand rebuilding of lopsided subtrees
//! - **Errors**: checked variants of every indexed operation ([`error`])
//!
//! ## Feature Flags
//!
//! - `arc`: Share nodes through `Arc` so ropes are `Send` and `Sync`
//! - `serde`: Serialize ropes as flat sequences and settings as records
//!
//! ## Logging
//!
//! Splits and joins emit `tracing` events at `TRACE` level and rebalancing
//! rebuilds at `DEBUG` level. No subscriber is installed by this crate.
//!
//! ## Example
//!
//! ```rust
//! use persistent_rope::prelude::*;
//!
//! let settings = RopeSettings::new(4, 2, 1.5).unwrap();
//! let rope = PersistentRope::from_vec(vec![0, 1, 2, 3, 4, 5, 6, 7], settings);
//!
//! let edited = rope.insert(2, &[-1, -2, -3]).remove(0..1);
//! assert_eq!(edited.slice(0..4), vec![1, -1, -2, -3]);
//! assert_eq!(rope.to_vec(), vec![0, 1, 2, 3, 4, 5, 6, 7]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types.
///
/// # Usage
///
/// ```rust
/// use persistent_rope::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{RopeError, SettingsError};
    pub use crate::persistent::PersistentRope;
    pub use crate::settings::RopeSettings;
}

pub mod error;
pub mod persistent;
pub mod settings;
