use thiserror::Error;

/// Errors returned by the clustering engine and the evaluation routines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// No samples (or zero-length vectors) were given.
    #[error("empty input")]
    EmptyInput,

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of samples in the dataset.
        n_items: usize,
    },

    /// Vectors that have to be of equal length are not.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Found length.
        found: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Every centroid lost all of its samples.
    #[error("degenerate clustering: no centroid has any assigned sample")]
    DegenerateClustering,

    /// The iteration cap was reached before the assignments stabilized.
    #[error("no convergence after {iterations} iterations")]
    NoConvergence {
        /// Amount of iterations that were run.
        iterations: usize,
    },
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
