use thiserror::Error;

/// Errors surfaced at the public boundary of the analysis engine.
///
/// Numerical trouble inside a scan (a bracket that fails to refine) is not an
/// error at this level; it is contained by the scanner and only counted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LakeError {
    /// Structurally invalid input: non-finite values, empty or inverted scan
    /// intervals, empty sweeps, unusable solver settings.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model parameters for which the rate function or its derivative is
    /// undefined.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, LakeError>;

pub(crate) fn invalid_input(message: impl Into<String>) -> LakeError {
    LakeError::InvalidInput(message.into())
}

pub(crate) fn invalid_parameter(message: impl Into<String>) -> LakeError {
    LakeError::InvalidParameter(message.into())
}
