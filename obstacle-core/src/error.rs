use thiserror::Error;

/// Errors raised while extracting obstacles from a point cloud
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObstacleError {
    /// The positions and the height-above-ground values of a point cloud are not index-aligned
    #[error("point cloud has {positions} positions but {heights} height above ground values")]
    ShapeMismatch { positions: usize, heights: usize },
    /// A parameter is outside of its valid range. Raised before any work is done
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    /// The run was cancelled through its `CancellationToken`
    #[error("obstacle extraction was cancelled")]
    Cancelled,
}

impl ObstacleError {
    pub fn invalid_parameter<S: Into<String>>(name: &'static str, reason: S) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Convenience `Result` type for the obstacle crates
pub type Result<T> = std::result::Result<T, ObstacleError>;

/// Returns an `InvalidParameter` error if `value` is not a finite number strictly greater than zero
pub fn ensure_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ObstacleError::invalid_parameter(
            name,
            format!("must be a finite number > 0, got {}", value),
        ))
    }
}

/// Returns an `InvalidParameter` error if `value` is not a finite number greater than or equal to zero
pub fn ensure_non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ObstacleError::invalid_parameter(
            name,
            format!("must be a finite number >= 0, got {}", value),
        ))
    }
}

/// Returns an `InvalidParameter` error if `value` is zero
pub fn ensure_non_zero(name: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        Err(ObstacleError::invalid_parameter(name, "must be > 0"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive("eps", 10.0).is_ok());
        assert!(matches!(
            ensure_positive("eps", 0.0),
            Err(ObstacleError::InvalidParameter { name: "eps", .. })
        ));
        assert!(ensure_positive("eps", -1.0).is_err());
        assert!(ensure_positive("eps", f64::NAN).is_err());
        assert!(ensure_positive("eps", f64::INFINITY).is_err());
    }

    #[test]
    fn test_ensure_non_negative() {
        assert!(ensure_non_negative("threshold", 0.0).is_ok());
        assert!(ensure_non_negative("threshold", -0.5).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = ObstacleError::ShapeMismatch {
            positions: 3,
            heights: 2,
        };
        assert_eq!(
            err.to_string(),
            "point cloud has 3 positions but 2 height above ground values"
        );
        assert_eq!(
            ensure_non_zero("min_points", 0).unwrap_err().to_string(),
            "invalid parameter 'min_points': must be > 0"
        );
    }
}
