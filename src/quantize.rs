//! Float-to-int8 quantization.
//!
//! Streams an f32 bin file into an i8 bin file with the same shape. Each
//! row is optionally L2-normalized, then every element is mapped through
//! `(x - bias) * 254/scale` and saturated into the i8 range. The payload is
//! processed in fixed-size row blocks so arbitrarily large inputs convert
//! in constant memory.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{GtError, GtResult};
use crate::formats::bin::{HEADER_SIZE, read_header, write_header};

/// Rows converted per block.
const BLOCK_ROWS: usize = 131072;

/// Affine rescale parameters for the float-to-int8 mapping.
#[derive(Debug, Clone, Copy)]
pub struct QuantizeParams {
    pub bias: f32,
    pub scale: f32,
    pub normalize: bool,
}

/// Shape and block count of a completed conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizeSummary {
    pub npts: usize,
    pub ndims: usize,
    pub blocks: usize,
}

/// Converts an f32 bin file into an i8 bin file.
///
/// The header is copied verbatim; the payload length is validated against
/// the header before any block is read, so a truncated input fails before
/// the output is partially written past its header.
pub fn quantize_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    params: QuantizeParams,
) -> GtResult<QuantizeSummary> {
    let input = input.as_ref();
    let output = output.as_ref();

    let read_err = |e| GtError::FileRead {
        path: input.to_path_buf(),
        source: e,
    };
    let write_err = |e| GtError::FileWrite {
        path: output.to_path_buf(),
        source: e,
    };

    let mut reader = File::open(input).map_err(read_err)?;
    let (npts, ndims, entries) = read_header(&mut reader, input)?;

    let expected = (entries as u64)
        .checked_mul(4)
        .and_then(|b| b.checked_add(HEADER_SIZE))
        .ok_or_else(|| GtError::MatrixTooLarge {
            path: input.to_path_buf(),
            npts: npts as i32,
            ndims: ndims as i32,
        })?;
    let actual = reader.metadata().map_err(read_err)?.len();
    if actual < expected {
        return Err(GtError::Truncated {
            path: input.to_path_buf(),
            expected,
            actual,
        });
    }

    info!(path = %input.display(), npts, ndims, "quantizing dataset");

    let out_file = File::create(output).map_err(write_err)?;
    let mut writer = BufWriter::new(out_file);
    write_header(&mut writer, npts as i32, ndims as i32).map_err(write_err)?;

    let factor = 254.0 / params.scale;
    let blocks = npts.div_ceil(BLOCK_ROWS);
    let block_rows = BLOCK_ROWS.min(npts.max(1));
    let mut read_buf = vec![0u8; block_rows * ndims * 4];
    let mut row = vec![0f32; ndims];
    let mut write_buf = Vec::with_capacity(block_rows * ndims);

    for block in 0..blocks {
        let rows = BLOCK_ROWS.min(npts - block * BLOCK_ROWS);
        let byte_len = rows * ndims * 4;
        reader
            .read_exact(&mut read_buf[..byte_len])
            .map_err(read_err)?;

        write_buf.clear();
        for r in 0..rows {
            let row_bytes = &read_buf[r * ndims * 4..(r + 1) * ndims * 4];
            for (value, chunk) in row.iter_mut().zip(row_bytes.chunks_exact(4)) {
                *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            }

            let norm = if params.normalize {
                row.iter().map(|x| x * x).sum::<f32>().sqrt()
            } else {
                1.0
            };

            for &value in &row {
                // Saturating float-to-int cast is the clip step.
                let quantized = ((value / norm - params.bias) * factor) as i8;
                write_buf.push(quantized as u8);
            }
        }
        writer.write_all(&write_buf).map_err(write_err)?;
        debug!(block, rows, "block written");
    }

    writer.flush().map_err(write_err)?;
    info!(path = %output.display(), blocks, "finished quantizing");

    Ok(QuantizeSummary {
        npts,
        ndims,
        blocks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn encode_f32_bin(npts: i32, ndims: i32, data: &[f32]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&npts.to_le_bytes());
        bytes.extend_from_slice(&ndims.to_le_bytes());
        for value in data {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    fn quantize_to_bytes(npts: i32, ndims: i32, data: &[f32], params: QuantizeParams) -> Vec<u8> {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in.bin");
        let output = temp_dir.path().join("out.bin");
        std::fs::write(&input, encode_f32_bin(npts, ndims, data)).unwrap();

        quantize_file(&input, &output, params).unwrap();
        std::fs::read(&output).unwrap()
    }

    #[test]
    fn test_identity_scale_truncates_toward_zero() {
        let params = QuantizeParams {
            bias: 0.0,
            scale: 254.0,
            normalize: false,
        };
        let bytes = quantize_to_bytes(1, 4, &[3.7, -2.9, 0.0, 100.2], params);

        assert_eq!(&bytes[..8], &encode_f32_bin(1, 4, &[])[..]);
        let payload: Vec<i8> = bytes[8..].iter().map(|&b| b as i8).collect();
        assert_eq!(payload, vec![3, -2, 0, 100]);
    }

    #[test]
    fn test_bias_and_scale_are_applied() {
        // (x - 1.0) * 254/127 = (x - 1.0) * 2
        let params = QuantizeParams {
            bias: 1.0,
            scale: 127.0,
            normalize: false,
        };
        let bytes = quantize_to_bytes(1, 3, &[1.0, 11.0, -9.0], params);
        let payload: Vec<i8> = bytes[8..].iter().map(|&b| b as i8).collect();
        assert_eq!(payload, vec![0, 20, -20]);
    }

    #[test]
    fn test_out_of_range_values_saturate() {
        let params = QuantizeParams {
            bias: 0.0,
            scale: 254.0,
            normalize: false,
        };
        let bytes = quantize_to_bytes(1, 2, &[1000.0, -1000.0], params);
        let payload: Vec<i8> = bytes[8..].iter().map(|&b| b as i8).collect();
        assert_eq!(payload, vec![127, -128]);
    }

    #[test]
    fn test_row_normalization() {
        // Row norm is 5; normalized values 0.6 and 0.8, scaled by 127.
        let params = QuantizeParams {
            bias: 0.0,
            scale: 2.0,
            normalize: true,
        };
        let bytes = quantize_to_bytes(1, 2, &[3.0, 4.0], params);
        let payload: Vec<i8> = bytes[8..].iter().map(|&b| b as i8).collect();
        assert_eq!(payload, vec![76, 101]);
    }

    #[test]
    fn test_normalization_is_per_row() {
        let params = QuantizeParams {
            bias: 0.0,
            scale: 2.0,
            normalize: true,
        };
        // Two rows with different norms must not influence each other.
        let bytes = quantize_to_bytes(2, 2, &[3.0, 4.0, 0.0, 2.0], params);
        let payload: Vec<i8> = bytes[8..].iter().map(|&b| b as i8).collect();
        assert_eq!(payload, vec![76, 101, 0, 127]);
    }

    #[test]
    fn test_truncated_input_is_rejected_before_writing_payload() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in.bin");
        let output = temp_dir.path().join("out.bin");
        let mut bytes = encode_f32_bin(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        bytes.truncate(bytes.len() - 3);
        std::fs::write(&input, &bytes).unwrap();

        let params = QuantizeParams {
            bias: 0.0,
            scale: 254.0,
            normalize: false,
        };
        assert!(matches!(
            quantize_file(&input, &output, params),
            Err(GtError::Truncated { .. })
        ));
    }

    #[test]
    fn test_summary_reports_shape_and_blocks() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in.bin");
        let output = temp_dir.path().join("out.bin");
        std::fs::write(&input, encode_f32_bin(3, 2, &[0.0; 6])).unwrap();

        let params = QuantizeParams {
            bias: 0.0,
            scale: 254.0,
            normalize: false,
        };
        let summary = quantize_file(&input, &output, params).unwrap();
        assert_eq!(
            summary,
            QuantizeSummary {
                npts: 3,
                ndims: 2,
                blocks: 1
            }
        );
    }
}
