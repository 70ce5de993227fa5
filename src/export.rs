//! Ground-truth CSV export.
//!
//! Renders a ground-truth file against its base and query vector sets: for
//! each query, one `qv:` line with the query vector followed by one `v:`
//! line per ranked neighbor with that neighbor's base vector, values
//! comma-separated. The output is meant for eyeballing whether a truth set
//! actually matches its dataset, not for machine consumption.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::{GtError, GtResult};
use crate::formats::{BinElement, BinMatrix, GroundTruth};

/// How one matrix element renders in the CSV output.
///
/// Integer element types print as decimal integers, floats as floats.
pub trait CsvElement: BinElement {
    fn write_csv<W: Write>(&self, writer: &mut W) -> io::Result<()>;
}

impl CsvElement for i8 {
    fn write_csv<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "{}", i32::from(*self))
    }
}

impl CsvElement for u8 {
    fn write_csv<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "{}", i32::from(*self))
    }
}

impl CsvElement for f32 {
    fn write_csv<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "{self}")
    }
}

/// Shape of a completed export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub nq: usize,
    pub k: usize,
    pub ndims: usize,
}

/// Loads the three inputs and writes the CSV rendering.
pub fn export_groundtruth_csv<T: CsvElement>(
    gt_path: impl AsRef<Path>,
    base_path: impl AsRef<Path>,
    query_path: impl AsRef<Path>,
    out_path: impl AsRef<Path>,
) -> GtResult<ExportSummary> {
    let gt = GroundTruth::load(gt_path)?;
    let base = BinMatrix::<T>::load(base_path)?;
    let query = BinMatrix::<T>::load(query_path)?;
    export_csv(&gt, &base, &query, out_path)
}

/// Writes the CSV rendering of `gt` against `base` and `query`.
///
/// The query matrix must hold one row per ground-truth query, base and
/// query must agree on dimensions, and every neighbor id must index into
/// the base matrix.
pub fn export_csv<T: CsvElement>(
    gt: &GroundTruth,
    base: &BinMatrix<T>,
    query: &BinMatrix<T>,
    out_path: impl AsRef<Path>,
) -> GtResult<ExportSummary> {
    let out_path = out_path.as_ref();

    if query.npts() != gt.nq() {
        return Err(GtError::QueryCountMismatch {
            nq: gt.nq(),
            query_npts: query.npts(),
        });
    }
    if base.ndims() != query.ndims() {
        return Err(GtError::DimensionMismatch {
            base_ndims: base.ndims(),
            query_ndims: query.ndims(),
        });
    }

    let write_err = |e| GtError::FileWrite {
        path: out_path.to_path_buf(),
        source: e,
    };

    let file = File::create(out_path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);

    for q in 0..gt.nq() {
        write_row(&mut writer, "qv:", query.row(q)).map_err(write_err)?;
        for &id in gt.ids_row(q) {
            let idx = id as usize;
            if idx >= base.npts() {
                return Err(GtError::NeighborOutOfRange {
                    id,
                    npts: base.npts(),
                });
            }
            write_row(&mut writer, "v:", base.row(idx)).map_err(write_err)?;
        }
    }
    writer.flush().map_err(write_err)?;

    info!(path = %out_path.display(), nq = gt.nq(), k = gt.k(), "finished writing truthset");

    Ok(ExportSummary {
        nq: gt.nq(),
        k: gt.k(),
        ndims: query.ndims(),
    })
}

fn write_row<T: CsvElement, W: Write>(writer: &mut W, tag: &str, values: &[T]) -> io::Result<()> {
    write!(writer, "{tag}\t")?;
    for (d, value) in values.iter().enumerate() {
        value.write_csv(writer)?;
        if d + 1 < values.len() {
            write!(writer, ",")?;
        }
    }
    writeln!(writer)
}
