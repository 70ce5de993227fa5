//! Exit codes for CLI operations following Unix conventions.
//!
//! # Exit Code Semantics
//!
//! - `0`: Success - operation completed, results printed
//! - `1`: General error - unspecified failure
//! - `2`: Argument error - malformed CLI arguments or out-of-range cut-off
//! - `3-125`: Specific recoverable errors
//! - `126-255`: Reserved by shell

use crate::error::GtError;

/// Standard exit codes for CLI operations.
///
/// These codes follow Unix conventions where 0 indicates success,
/// and non-zero values indicate various error conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation succeeded (code 0)
    Success = 0,

    /// Unspecified error occurred (code 1)
    GeneralError = 1,

    /// Missing or malformed arguments, cut-off out of range (code 2)
    /// Matches the code clap itself uses for usage errors
    ArgumentError = 2,

    /// File could not be read or written (code 3)
    IoError = 3,

    /// Header or shape invalid (code 4)
    FormatError = 4,

    /// File shorter than its header declares (code 5)
    TruncatedError = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl ExitCode {
    /// Convert a `GtError` to the appropriate exit code.
    ///
    /// Maps specific error types to semantic exit codes that scripts
    /// can use to distinguish failure causes.
    pub fn from_error(error: &GtError) -> Self {
        match error {
            GtError::FileRead { .. } | GtError::FileWrite { .. } => ExitCode::IoError,

            GtError::InvalidHeader { .. }
            | GtError::MatrixTooLarge { .. }
            | GtError::ShapeMismatch { .. }
            | GtError::NeighborOutOfRange { .. }
            | GtError::DimensionMismatch { .. }
            | GtError::QueryCountMismatch { .. } => ExitCode::FormatError,

            GtError::Truncated { .. } => ExitCode::TruncatedError,

            GtError::CutoffOutOfRange { .. } => ExitCode::ArgumentError,
        }
    }

    /// Check if this exit code indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }

    /// Get a human-readable description of the exit code.
    pub fn description(&self) -> &str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::ArgumentError => "Argument error",
            ExitCode::IoError => "I/O error",
            ExitCode::FormatError => "Format error",
            ExitCode::TruncatedError => "Truncated file",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success as u8, 0);
        assert_eq!(ExitCode::GeneralError as u8, 1);
        assert_eq!(ExitCode::ArgumentError as u8, 2);
        assert_eq!(ExitCode::IoError as u8, 3);
        assert_eq!(ExitCode::FormatError as u8, 4);
        assert_eq!(ExitCode::TruncatedError as u8, 5);
    }

    #[test]
    fn test_from_error_mapping() {
        let err = GtError::FileRead {
            path: PathBuf::from("missing.bin"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(ExitCode::from_error(&err), ExitCode::IoError);

        let err = GtError::ShapeMismatch {
            nq1: 10,
            k1: 5,
            nq2: 10,
            k2: 6,
        };
        assert_eq!(ExitCode::from_error(&err), ExitCode::FormatError);

        let err = GtError::Truncated {
            path: PathBuf::from("gt.bin"),
            expected: 100,
            actual: 50,
        };
        assert_eq!(ExitCode::from_error(&err), ExitCode::TruncatedError);

        let err = GtError::CutoffOutOfRange { at: 11, k: 10 };
        assert_eq!(ExitCode::from_error(&err), ExitCode::ArgumentError);
    }

    #[test]
    fn test_is_success() {
        assert!(ExitCode::Success.is_success());
        assert!(!ExitCode::FormatError.is_success());
        assert!(!ExitCode::GeneralError.is_success());
    }
}
