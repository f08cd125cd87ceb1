use thiserror::Error;

/// Errors returned when an input cannot describe a point, basis, or convention.
///
/// Degenerate-but-valid geometry (zero vectors, poles, gimbal lock) never produces an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The input does not have the arity of a 3D point.
    #[error("expected {expected} components per point, got {found}")]
    InvalidShape {
        /// The number of components a point must have.
        expected: usize,
        /// The number of components that were provided.
        found: usize,
    },

    /// A component is outside the domain of its representation.
    #[error("{quantity} must be in {range}, got {value}")]
    InvalidValue {
        /// The name of the offending component.
        quantity: &'static str,
        /// The accepted range, in human-readable form.
        range: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A matrix that should be orthonormal is not.
    #[error("matrix is not orthonormal (deviation {deviation:e})")]
    InvalidBasis {
        /// Frobenius norm of `M Mᵀ - I`.
        deviation: f64,
    },

    /// The name does not match any supported Euler angle convention.
    #[error("unknown Euler angle convention {0:?}")]
    UnknownConvention(String),
}

/// Result type for fallible coordinate operations.
pub type Result<T> = std::result::Result<T, Error>;
