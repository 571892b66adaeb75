//! Per-tree sizing configuration.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Branching factor used by [`Options::default`].
pub const DEFAULT_DEGREE: usize = 128;

/// Smallest accepted branching factor.
pub const MIN_DEGREE: usize = 2;

pub(crate) const DEFAULT_LAYOUT: Layout = Layout {
    max_items: DEFAULT_DEGREE * 2 - 1,
    min_items: (DEFAULT_DEGREE * 2 - 1) / 2,
};

/// Construction options for a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
    /// Branching factor. A node holds at most `2 * degree - 1` items and,
    /// unless it is the root, at least `(2 * degree - 1) / 2`.
    pub degree: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            degree: DEFAULT_DEGREE,
        }
    }
}

impl Options {
    pub fn with_degree(degree: usize) -> Self {
        Self { degree }
    }

    /// Validate the options and derive node size bounds.
    pub fn layout(&self) -> Result<Layout> {
        if self.degree < MIN_DEGREE {
            tracing::warn!(degree = self.degree, "rejecting tree options");
            return Err(Error::InvalidDegree {
                degree: self.degree,
            });
        }
        let max_items = self
            .degree
            .checked_mul(2)
            .map(|n| n - 1)
            .ok_or(Error::InvalidDegree {
                degree: self.degree,
            })?;
        Ok(Layout {
            max_items,
            min_items: max_items / 2,
        })
    }
}

/// Node size bounds derived from a validated degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub max_items: usize,
    pub min_items: usize,
}
