//! Binary matrix codecs for the ANN file formats.
//!
//! Two layouts share the same `(i32 npts, i32 ndims)` little-endian header:
//! ground-truth files carry an id matrix followed by a distance matrix,
//! vector bin files carry a single element matrix.

pub mod bin;
pub mod gt;

pub use bin::{BinElement, BinMatrix};
pub use gt::GroundTruth;
