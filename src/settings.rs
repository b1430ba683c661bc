//! Thresholds controlling the shape of a rope.
//!
//! A [`RopeSettings`] value is pure data: it decides when a leaf is split,
//! when an internal node is flattened back into a leaf, and how lopsided an
//! internal node may become before [`rebalance`] rebuilds it.
//!
//! Every rope derived from another rope (by `insert`, `remove`, `append` or
//! `rebalanced`) shares the settings instance of its source.
//!
//! [`rebalance`]: crate::persistent::PersistentRope::rebalance
//!
//! # Examples
//!
//! ```rust
//! use persistent_rope::settings::RopeSettings;
//!
//! let settings = RopeSettings::new(64, 16, 2.0).unwrap();
//! assert_eq!(settings.split_length(), 64);
//! assert_eq!(settings.join_length(), 16);
//!
//! assert!(RopeSettings::new(16, 64, 2.0).is_err());
//! ```

use crate::error::SettingsError;

/// Split, join and rebalance thresholds of a rope.
///
/// The invariant `join_length < split_length` is checked by [`RopeSettings::new`];
/// without it a freshly joined leaf could exceed the split threshold and
/// adjustment would flip between the two node shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "SettingsRecord"))]
pub struct RopeSettings {
    split_length: usize,
    join_length: usize,
    rebalance_ratio: f64,
}

impl RopeSettings {
    /// Split at 400 elements, join below 200, rebalance past a 1.5 ratio.
    pub const DEFAULT: Self = Self {
        split_length: 400,
        join_length: 200,
        rebalance_ratio: 1.5,
    };

    /// Creates validated settings.
    ///
    /// # Arguments
    ///
    /// * `split_length` - Longest leaf buffer; longer leaves are split at their midpoint
    /// * `join_length` - Internal nodes shorter than this are flattened into a leaf
    /// * `rebalance_ratio` - Largest tolerated ratio between the lengths of two siblings
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] when `split_length` is zero, when
    /// `join_length >= split_length`, or when `rebalance_ratio` is not a
    /// finite number of at least `1.0`.
    pub fn new(
        split_length: usize,
        join_length: usize,
        rebalance_ratio: f64,
    ) -> Result<Self, SettingsError> {
        if split_length == 0 {
            return Err(SettingsError::ZeroSplitLength);
        }
        if join_length >= split_length {
            return Err(SettingsError::JoinNotBelowSplit {
                split_length,
                join_length,
            });
        }
        if !rebalance_ratio.is_finite() || rebalance_ratio < 1.0 {
            return Err(SettingsError::InvalidRebalanceRatio(rebalance_ratio));
        }
        Ok(Self {
            split_length,
            join_length,
            rebalance_ratio,
        })
    }

    /// Returns the longest leaf buffer allowed.
    #[inline]
    pub const fn split_length(&self) -> usize {
        self.split_length
    }

    /// Returns the length below which an internal node is joined into a leaf.
    #[inline]
    pub const fn join_length(&self) -> usize {
        self.join_length
    }

    /// Returns the sibling length ratio that triggers a rebuild on rebalance.
    #[inline]
    pub const fn rebalance_ratio(&self) -> f64 {
        self.rebalance_ratio
    }

    /// Returns `true` when a node with these child lengths is too lopsided.
    ///
    /// An empty side next to a non-empty one counts as infinitely lopsided.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn is_skewed(&self, left_length: usize, right_length: usize) -> bool {
        let left = left_length as f64;
        let right = right_length as f64;
        left / right > self.rebalance_ratio || right / left > self.rebalance_ratio
    }
}

impl Default for RopeSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct SettingsRecord {
    split_length: usize,
    join_length: usize,
    rebalance_ratio: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<SettingsRecord> for RopeSettings {
    type Error = SettingsError;

    fn try_from(record: SettingsRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.split_length,
            record.join_length,
            record.rebalance_ratio,
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
