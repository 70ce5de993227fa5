/// The main library module for gtkit
pub mod error;
pub mod export;
pub mod formats;
pub mod io;
pub mod overlap;
pub mod quantize;

// Explicit exports for better API clarity
pub use error::{GtError, GtResult};
pub use formats::{BinElement, BinMatrix, GroundTruth};
pub use overlap::{OverlapEntry, OverlapReport, compute_report, ensure_same_shape, overlap_at};
pub use quantize::{QuantizeParams, QuantizeSummary, quantize_file};
