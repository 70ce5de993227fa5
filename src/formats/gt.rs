//! Ground-truth file codec.
//!
//! # Storage Format
//!
//! A ground-truth file holds the exact k-nearest-neighbor answer for a
//! query set, all little-endian:
//! - Header (8 bytes): `npts` and `ndims` as signed 32-bit integers
//! - Ids: `npts x ndims` unsigned 32-bit neighbor ids, row-major
//! - Distances: `npts x ndims` 32-bit floats, row-major, aligned with ids
//!
//! Each query row is a ranked list: distances are non-decreasing along the
//! row by contract with the producer. The loader does not re-check that
//! ordering; the overlap evaluator relies on it only through the same-rank
//! distance-tie rule.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{GtError, GtResult};
use crate::formats::bin::{HEADER_SIZE, read_header};

/// Bytes occupied by one (id, distance) entry across the two matrices.
const BYTES_PER_ENTRY: u64 = 8;

/// One loaded ground-truth file: parallel id and distance matrices.
///
/// Immutable after load. The evaluator borrows rows read-only; nothing
/// here is copied per query.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundTruth {
    nq: usize,
    k: usize,
    ids: Vec<u32>,
    dists: Vec<f32>,
}

impl GroundTruth {
    /// Builds a ground truth from in-memory matrices.
    ///
    /// # Panics
    /// Panics if `ids` or `dists` is not exactly `nq * k` entries long.
    #[must_use]
    pub fn from_parts(nq: usize, k: usize, ids: Vec<u32>, dists: Vec<f32>) -> Self {
        assert_eq!(ids.len(), nq * k, "id matrix must be nq x k");
        assert_eq!(dists.len(), nq * k, "distance matrix must be nq x k");
        Self { nq, k, ids, dists }
    }

    /// Loads a ground-truth file from disk.
    ///
    /// Validates the header (nonnegative `npts`, positive `ndims`, product
    /// within `usize`) and the file length before touching the payload,
    /// then reads each matrix with a single bulk read.
    pub fn load(path: impl AsRef<Path>) -> GtResult<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| GtError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let (nq, k, entries) = read_header(&mut file, path)?;

        let expected = payload_bytes(path, nq as i32, k as i32, entries)?;
        let actual = file
            .metadata()
            .map_err(|e| GtError::FileRead {
                path: path.to_path_buf(),
                source: e,
            })?
            .len();
        if actual < expected {
            return Err(GtError::Truncated {
                path: path.to_path_buf(),
                expected,
                actual,
            });
        }

        debug!(path = %path.display(), nq, k, "reading ground-truth file");

        let ids = read_u32_matrix(&mut file, path, entries)?;
        let dists = read_f32_matrix(&mut file, path, entries)?;

        debug!(path = %path.display(), "finished reading ground-truth file");

        Ok(Self { nq, k, ids, dists })
    }

    /// Writes this ground truth back out in the canonical layout.
    ///
    /// Loading a canonical file and saving it again yields byte-identical
    /// output.
    pub fn save(&self, path: impl AsRef<Path>) -> GtResult<()> {
        let path = path.as_ref();
        let write_err = |e| GtError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        };

        let file = File::create(path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);

        writer
            .write_all(&(self.nq as i32).to_le_bytes())
            .map_err(write_err)?;
        writer
            .write_all(&(self.k as i32).to_le_bytes())
            .map_err(write_err)?;
        for id in &self.ids {
            writer.write_all(&id.to_le_bytes()).map_err(write_err)?;
        }
        for dist in &self.dists {
            writer.write_all(&dist.to_le_bytes()).map_err(write_err)?;
        }
        writer.flush().map_err(write_err)?;

        Ok(())
    }

    /// Number of queries.
    #[must_use]
    pub fn nq(&self) -> usize {
        self.nq
    }

    /// Neighbors per query.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Ranked neighbor ids for query `i`.
    #[must_use]
    pub fn ids_row(&self, i: usize) -> &[u32] {
        &self.ids[i * self.k..(i + 1) * self.k]
    }

    /// Distances aligned with `ids_row(i)`.
    #[must_use]
    pub fn dists_row(&self, i: usize) -> &[f32] {
        &self.dists[i * self.k..(i + 1) * self.k]
    }
}

fn payload_bytes(path: &Path, npts: i32, ndims: i32, entries: usize) -> GtResult<u64> {
    (entries as u64)
        .checked_mul(BYTES_PER_ENTRY)
        .and_then(|b| b.checked_add(HEADER_SIZE))
        .ok_or_else(|| GtError::MatrixTooLarge {
            path: path.to_path_buf(),
            npts,
            ndims,
        })
}

fn read_u32_matrix(file: &mut File, path: &Path, entries: usize) -> GtResult<Vec<u32>> {
    let mut buf = vec![0u8; entries * 4];
    file.read_exact(&mut buf).map_err(|e| GtError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(buf
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

fn read_f32_matrix(file: &mut File, path: &Path, entries: usize) -> GtResult<Vec<f32>> {
    let mut buf = vec![0u8; entries * 4];
    file.read_exact(&mut buf).map_err(|e| GtError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(buf
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}
