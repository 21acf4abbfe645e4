//! Error types for the Pareto archive.

/// Errors raised when configuring or using the Pareto archive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParetoError {
    /// The archive size range is empty or starts at zero.
    #[error("invalid pareto set size range {min}..={max}: need 1 <= min <= max")]
    InvalidSizeRange { min: usize, max: usize },

    /// Two fitness vectors of different dimensionality were compared.
    #[error("fitness vectors differ in length: {left} != {right}")]
    DimensionMismatch { left: usize, right: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = ParetoError::InvalidSizeRange { min: 5, max: 2 };
        assert_eq!(
            e.to_string(),
            "invalid pareto set size range 5..=2: need 1 <= min <= max"
        );

        let e = ParetoError::DimensionMismatch { left: 2, right: 3 };
        assert_eq!(e.to_string(), "fitness vectors differ in length: 2 != 3");
    }
}
