//! Errors raised while an engine produces generations.

/// Failure inside an evolution engine.
///
/// Composed engines never translate these: the `Err` item produced by the
/// failing engine is handed to the consumer as-is, and the composed stream
/// ends right after it.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Fitness evaluation failed.
    #[error("evaluation failed in generation {generation}: {message}")]
    Evaluation {
        /// Generation that was being computed.
        generation: u64,
        /// Description of the failure.
        message: String,
    },

    /// Any other error raised by an engine implementation.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl EngineError {
    /// Shorthand for [`EngineError::Evaluation`].
    pub fn evaluation(generation: u64, message: impl Into<String>) -> Self {
        EngineError::Evaluation {
            generation,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_message() {
        let err = EngineError::evaluation(4, "division by zero");
        assert_eq!(
            err.to_string(),
            "evaluation failed in generation 4: division by zero"
        );
    }

    #[test]
    fn test_other_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = EngineError::from(Box::new(io) as Box<dyn std::error::Error + Send + Sync>);
        assert_eq!(err.to_string(), "disk gone");
    }
}
