//! Generic single-matrix bin codec.
//!
//! Base vectors, query vectors, and quantizer output all share one layout:
//! an `(i32 npts, i32 ndims)` little-endian header followed by a row-major
//! element matrix. The element width is the only thing that varies, so the
//! codec is generic over a small element trait.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{GtError, GtResult};

/// Header size shared by all bin layouts.
pub(crate) const HEADER_SIZE: u64 = 8;

/// One element of a bin matrix: fixed on-disk width, little-endian.
pub trait BinElement: Copy {
    /// Bytes per element on disk.
    const WIDTH: usize;

    /// Decodes one element from exactly `WIDTH` bytes.
    fn decode(bytes: &[u8]) -> Self;

    /// Appends the little-endian encoding of `self`.
    fn encode(&self, out: &mut Vec<u8>);
}

impl BinElement for f32 {
    const WIDTH: usize = 4;

    fn decode(bytes: &[u8]) -> Self {
        f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl BinElement for i8 {
    const WIDTH: usize = 1;

    fn decode(bytes: &[u8]) -> Self {
        bytes[0] as i8
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.push(*self as u8);
    }
}

impl BinElement for u8 {
    const WIDTH: usize = 1;

    fn decode(bytes: &[u8]) -> Self {
        bytes[0]
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.push(*self);
    }
}

/// A dense row-major matrix loaded from a bin file.
#[derive(Debug, Clone, PartialEq)]
pub struct BinMatrix<T: BinElement> {
    npts: usize,
    ndims: usize,
    data: Vec<T>,
}

impl<T: BinElement> BinMatrix<T> {
    /// Builds a matrix from in-memory data.
    ///
    /// # Panics
    /// Panics if `data` is not exactly `npts * ndims` entries long.
    #[must_use]
    pub fn from_parts(npts: usize, ndims: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), npts * ndims, "matrix must be npts x ndims");
        Self { npts, ndims, data }
    }

    /// Loads a bin file: validated header, then one bulk payload read.
    pub fn load(path: impl AsRef<Path>) -> GtResult<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| GtError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let (npts, ndims, entries) = read_header(&mut file, path)?;

        let payload = (entries as u64)
            .checked_mul(T::WIDTH as u64)
            .and_then(|b| b.checked_add(HEADER_SIZE))
            .ok_or_else(|| GtError::MatrixTooLarge {
                path: path.to_path_buf(),
                npts: npts as i32,
                ndims: ndims as i32,
            })?;
        let actual = file
            .metadata()
            .map_err(|e| GtError::FileRead {
                path: path.to_path_buf(),
                source: e,
            })?
            .len();
        if actual < payload {
            return Err(GtError::Truncated {
                path: path.to_path_buf(),
                expected: payload,
                actual,
            });
        }

        debug!(path = %path.display(), npts, ndims, "reading bin file");

        let mut buf = vec![0u8; entries * T::WIDTH];
        file.read_exact(&mut buf).map_err(|e| GtError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let data = buf.chunks_exact(T::WIDTH).map(T::decode).collect();

        Ok(Self { npts, ndims, data })
    }

    /// Writes the matrix back out in the canonical layout.
    pub fn save(&self, path: impl AsRef<Path>) -> GtResult<()> {
        let path = path.as_ref();
        let write_err = |e| GtError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        };

        let file = File::create(path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        write_header(&mut writer, self.npts as i32, self.ndims as i32).map_err(write_err)?;

        let mut payload = Vec::with_capacity(self.data.len() * T::WIDTH);
        for value in &self.data {
            value.encode(&mut payload);
        }
        writer.write_all(&payload).map_err(write_err)?;
        writer.flush().map_err(write_err)?;

        Ok(())
    }

    /// Number of rows.
    #[must_use]
    pub fn npts(&self) -> usize {
        self.npts
    }

    /// Elements per row.
    #[must_use]
    pub fn ndims(&self) -> usize {
        self.ndims
    }

    /// Row `i` as a slice.
    #[must_use]
    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.ndims..(i + 1) * self.ndims]
    }
}

/// Reads and validates the `(npts, ndims)` header.
///
/// Returns `(npts, ndims, npts * ndims)`. Negative `npts`, non-positive
/// `ndims`, and products that overflow the platform index type are rejected
/// here so no caller ever sizes a buffer from a bad header.
pub(crate) fn read_header(file: &mut File, path: &Path) -> GtResult<(usize, usize, usize)> {
    let read_err = |e| GtError::FileRead {
        path: path.to_path_buf(),
        source: e,
    };

    let actual = file.metadata().map_err(read_err)?.len();
    if actual < HEADER_SIZE {
        return Err(GtError::Truncated {
            path: path.to_path_buf(),
            expected: HEADER_SIZE,
            actual,
        });
    }

    let mut word = [0u8; 4];
    file.read_exact(&mut word).map_err(read_err)?;
    let npts = i32::from_le_bytes(word);
    file.read_exact(&mut word).map_err(read_err)?;
    let ndims = i32::from_le_bytes(word);

    if npts < 0 || ndims <= 0 {
        return Err(GtError::InvalidHeader {
            path: path.to_path_buf(),
            npts,
            ndims,
        });
    }

    let entries = (npts as usize)
        .checked_mul(ndims as usize)
        .ok_or_else(|| GtError::MatrixTooLarge {
            path: path.to_path_buf(),
            npts,
            ndims,
        })?;

    Ok((npts as usize, ndims as usize, entries))
}

/// Writes the `(npts, ndims)` header.
pub(crate) fn write_header<W: Write>(writer: &mut W, npts: i32, ndims: i32) -> std::io::Result<()> {
    writer.write_all(&npts.to_le_bytes())?;
    writer.write_all(&ndims.to_le_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn encode_bin<T: BinElement>(npts: i32, ndims: i32, data: &[T]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&npts.to_le_bytes());
        bytes.extend_from_slice(&ndims.to_le_bytes());
        for value in data {
            value.encode(&mut bytes);
        }
        bytes
    }

    #[test]
    fn test_load_f32_matrix() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("base.bin");
        let data = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        std::fs::write(&path, encode_bin(2, 3, &data)).unwrap();

        let matrix = BinMatrix::<f32>::load(&path).unwrap();
        assert_eq!(matrix.npts(), 2);
        assert_eq!(matrix.ndims(), 3);
        assert_eq!(matrix.row(0), &[1.0, 2.0, 3.0]);
        assert_eq!(matrix.row(1), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_load_i8_matrix() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("base_i8.bin");
        let data = [-128i8, -1, 0, 1, 2, 127];
        std::fs::write(&path, encode_bin(3, 2, &data)).unwrap();

        let matrix = BinMatrix::<i8>::load(&path).unwrap();
        assert_eq!(matrix.row(0), &[-128, -1]);
        assert_eq!(matrix.row(2), &[2, 127]);
    }

    #[test]
    fn test_load_rejects_bad_headers() {
        let temp_dir = TempDir::new().unwrap();

        let negative = temp_dir.path().join("neg.bin");
        std::fs::write(&negative, encode_bin::<u8>(-3, 4, &[])).unwrap();
        assert!(matches!(
            BinMatrix::<u8>::load(&negative),
            Err(GtError::InvalidHeader { npts: -3, .. })
        ));

        let zero_dim = temp_dir.path().join("zero.bin");
        std::fs::write(&zero_dim, encode_bin::<u8>(3, 0, &[])).unwrap();
        assert!(matches!(
            BinMatrix::<u8>::load(&zero_dim),
            Err(GtError::InvalidHeader { ndims: 0, .. })
        ));
    }

    #[test]
    fn test_load_rejects_truncated_payload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("short.bin");
        let mut bytes = encode_bin(2, 4, &[0.5f32; 8]);
        bytes.truncate(bytes.len() - 1);
        std::fs::write(&path, &bytes).unwrap();

        match BinMatrix::<f32>::load(&path) {
            Err(GtError::Truncated {
                expected, actual, ..
            }) => {
                assert_eq!(expected, 8 + 4 * 8);
                assert_eq!(actual, expected - 1);
            }
            other => panic!("expected Truncated, got {other:?}"),
        }
    }

    #[test]
    fn test_save_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.bin");

        let matrix = BinMatrix::from_parts(2, 2, vec![9u8, 8, 7, 6]);
        matrix.save(&path).unwrap();

        let reloaded = BinMatrix::<u8>::load(&path).unwrap();
        assert_eq!(reloaded, matrix);
        assert_eq!(std::fs::read(&path).unwrap(), encode_bin(2, 2, &[9u8, 8, 7, 6]));
    }
}
