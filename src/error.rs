//! Error types for the ground-truth tooling
//!
//! This module provides structured error types using thiserror so every
//! failure carries the file and values that caused it.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for all gtkit operations
#[derive(Error, Debug)]
pub enum GtError {
    /// File system errors
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Header declares a shape no valid file can have
    #[error(
        "Invalid header in '{path}': npts={npts}, ndims={ndims} (npts must be nonnegative, ndims positive)"
    )]
    InvalidHeader {
        path: PathBuf,
        npts: i32,
        ndims: i32,
    },

    #[error("Matrix in '{path}' too large to index: {npts} x {ndims} overflows usize")]
    MatrixTooLarge {
        path: PathBuf,
        npts: i32,
        ndims: i32,
    },

    /// File ends before the payload its header declares
    #[error("File '{path}' is truncated: header requires {expected} bytes, file has {actual}")]
    Truncated {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// The two inputs do not describe the same query set
    #[error(
        "Ground-truth files of unequal sizes: {nq1} x {k1} vs {nq2} x {k2}. Both files must share (nq, K)."
    )]
    ShapeMismatch {
        nq1: usize,
        k1: usize,
        nq2: usize,
        k2: usize,
    },

    /// Cut-off outside [1, K]
    #[error("Cannot compute overlap at {at}: cut-off must be in 1..=K (K={k})")]
    CutoffOutOfRange { at: usize, k: usize },

    /// Ground-truth id points past the end of the base matrix
    #[error("Neighbor id {id} out of range: base file holds {npts} vectors")]
    NeighborOutOfRange { id: u32, npts: usize },

    #[error("Base and query files disagree on dimensions: {base_ndims} vs {query_ndims}")]
    DimensionMismatch {
        base_ndims: usize,
        query_ndims: usize,
    },

    #[error("Ground truth holds {nq} queries but query file holds {query_npts}")]
    QueryCountMismatch { nq: usize, query_npts: usize },
}

impl GtError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier used in JSON responses for
    /// programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::FileRead { .. } => "FILE_READ_ERROR",
            Self::FileWrite { .. } => "FILE_WRITE_ERROR",
            Self::InvalidHeader { .. } => "INVALID_HEADER",
            Self::MatrixTooLarge { .. } => "MATRIX_TOO_LARGE",
            Self::Truncated { .. } => "TRUNCATED_FILE",
            Self::ShapeMismatch { .. } => "SHAPE_MISMATCH",
            Self::CutoffOutOfRange { .. } => "CUTOFF_OUT_OF_RANGE",
            Self::NeighborOutOfRange { .. } => "NEIGHBOR_OUT_OF_RANGE",
            Self::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            Self::QueryCountMismatch { .. } => "QUERY_COUNT_MISMATCH",
        }
        .to_string()
    }
}

/// Result type alias for gtkit operations
pub type GtResult<T> = Result<T, GtError>;
