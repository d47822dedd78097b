use thiserror::Error;

/// Failures of the fitting procedure itself.
///
/// Too little data is not an error: fitters report it as `Ok(None)` / `None`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FitError {
    /// `det` is the determinant that failed the check, relative to its scale
    /// when the pressure spread check fired.
    #[error("singular system: normal-equation determinant {det:e} is too close to zero")]
    SingularSystem { det: f64 },
    #[error("fit produced a non-finite {0}")]
    NonFinite(&'static str),
    #[error("invalid fit config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = std::result::Result<T, FitError>;
