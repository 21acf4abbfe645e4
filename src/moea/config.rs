//! Archive configuration.

use super::ParetoError;

/// Size bounds of a Pareto archive.
///
/// An archive never holds more than `max` elements. When an addition pushes
/// it above `max`, it is shrunk to exactly `min` elements.
///
/// # Example
///
/// ```
/// use u_evostream::moea::SizeRange;
///
/// let range = SizeRange::new(10, 20).unwrap();
/// assert_eq!((range.min(), range.max()), (10, 20));
///
/// assert!(SizeRange::new(0, 20).is_err());
/// assert!(SizeRange::new(30, 20).is_err());
/// assert_eq!(SizeRange::default(), SizeRange::new(75, 100).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "(usize, usize)", into = "(usize, usize)")
)]
pub struct SizeRange {
    min: usize,
    max: usize,
}

impl SizeRange {
    /// Creates a validated range `min..=max`.
    ///
    /// # Errors
    ///
    /// [`ParetoError::InvalidSizeRange`] if `min == 0` or `min > max`.
    pub fn new(min: usize, max: usize) -> Result<Self, ParetoError> {
        if min == 0 || min > max {
            return Err(ParetoError::InvalidSizeRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// A range that always shrinks to exactly `size` elements.
    ///
    /// # Errors
    ///
    /// [`ParetoError::InvalidSizeRange`] if `size == 0`.
    pub fn exact(size: usize) -> Result<Self, ParetoError> {
        Self::new(size, size)
    }

    /// Size an over-full archive is shrunk to.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Largest size an archive may have.
    pub fn max(&self) -> usize {
        self.max
    }
}

impl Default for SizeRange {
    fn default() -> Self {
        Self { min: 75, max: 100 }
    }
}

impl TryFrom<(usize, usize)> for SizeRange {
    type Error = ParetoError;

    fn try_from((min, max): (usize, usize)) -> Result<Self, Self::Error> {
        Self::new(min, max)
    }
}

impl From<SizeRange> for (usize, usize) {
    fn from(range: SizeRange) -> Self {
        (range.min, range.max)
    }
}

/// Optimization direction of every objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Optimize {
    /// Larger objective values are better.
    #[default]
    Maximum,
    /// Smaller objective values are better.
    Minimum,
}
