//! Error types for rope operations and rope settings.
//!
//! Rope operations come in two flavours: an unchecked form (`insert`,
//! `remove`, `slice`, ...) that panics on an invalid index or range, and a
//! checked `try_*` form that reports the problem as a [`RopeError`].
//! Invalid [`RopeSettings`](crate::settings::RopeSettings) are rejected at
//! construction time with a [`SettingsError`].

use std::fmt;

/// Represents an invalid index, range or buffer passed to a rope operation.
///
/// # Examples
///
/// ```rust
/// use persistent_rope::error::RopeError;
///
/// let error = RopeError::IndexOutOfBounds { index: 9, length: 4 };
/// assert_eq!(
///     format!("{error}"),
///     "index 9 is out of bounds for a rope of length 4"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RopeError {
    /// An insertion index was greater than the rope's length.
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The length of the rope.
        length: usize,
    },
    /// A range ended past the rope's length.
    RangeOutOfBounds {
        /// The start of the requested range.
        start: usize,
        /// The end of the requested range.
        end: usize,
        /// The length of the rope.
        length: usize,
    },
    /// A range started after it ended.
    InvertedRange {
        /// The start of the requested range.
        start: usize,
        /// The end of the requested range.
        end: usize,
    },
    /// A destination buffer could not hold the copied elements.
    DestinationTooShort {
        /// The number of slots the copy needs.
        required: usize,
        /// The number of slots the destination has.
        actual: usize,
    },
}

impl fmt::Display for RopeError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfBounds { index, length } => write!(
                formatter,
                "index {index} is out of bounds for a rope of length {length}"
            ),
            Self::RangeOutOfBounds { start, end, length } => write!(
                formatter,
                "range {start}..{end} is out of bounds for a rope of length {length}"
            ),
            Self::InvertedRange { start, end } => {
                write!(formatter, "range starts at {start} but ends at {end}")
            }
            Self::DestinationTooShort { required, actual } => write!(
                formatter,
                "destination holds {actual} elements but {required} are required"
            ),
        }
    }
}

impl std::error::Error for RopeError {}

/// Represents a rejected combination of rope thresholds.
///
/// # Examples
///
/// ```rust
/// use persistent_rope::error::SettingsError;
/// use persistent_rope::settings::RopeSettings;
///
/// let error = RopeSettings::new(4, 4, 1.5).unwrap_err();
/// assert_eq!(
///     error,
///     SettingsError::JoinNotBelowSplit { split_length: 4, join_length: 4 }
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// The split length was zero, so no leaf could ever hold an element.
    ZeroSplitLength,
    /// The join length was not strictly below the split length.
    ///
    /// A joined leaf could immediately exceed the split threshold again and
    /// adjustment would oscillate between the two shapes.
    JoinNotBelowSplit {
        /// The configured split length.
        split_length: usize,
        /// The configured join length.
        join_length: usize,
    },
    /// The rebalance ratio was not a finite number of at least `1.0`.
    InvalidRebalanceRatio(f64),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSplitLength => formatter.write_str("split length must be at least 1"),
            Self::JoinNotBelowSplit {
                split_length,
                join_length,
            } => write!(
                formatter,
                "join length {join_length} must be below split length {split_length}"
            ),
            Self::InvalidRebalanceRatio(ratio) => write!(
                formatter,
                "rebalance ratio {ratio} must be a finite number of at least 1.0"
            ),
        }
    }
}

impl std::error::Error for SettingsError {}
