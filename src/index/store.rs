//! Reading and writing the corpus matrix as NumPy `.npy` / `.npz` through candle.
//!
//! `.npz` archives hold several named arrays; the matrix is looked up by name. Any float
//! dtype candle can read is accepted and widened to `f32`. Shapes are `(N, D)` or
//! `(N, 1, D)`, the latter being what stacking pooled `(1, D)` sentence embeddings gives.

use std::path::Path;

use candle_core::{DType, Device, Tensor};

use super::error::{IndexError, IndexResult};

/// On-disk container, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixFormat {
    Npy,
    Npz,
}

impl MatrixFormat {
    /// `.npz` (any case) is an archive; everything else is read as a bare `.npy`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("npz") => MatrixFormat::Npz,
            _ => MatrixFormat::Npy,
        }
    }
}

/// Reads the matrix at `path`, returning `(data, rows, cols)` in row-major order.
///
/// `array_name` selects the array inside an `.npz` and is ignored for `.npy`.
pub fn read_matrix(path: &Path, array_name: &str) -> IndexResult<(Vec<f32>, usize, usize)> {
    if !path.exists() {
        return Err(IndexError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let tensor = match MatrixFormat::from_path(path) {
        MatrixFormat::Npy => Tensor::read_npy(path)?,
        MatrixFormat::Npz => Tensor::read_npz_by_name(path, &[array_name])?
            .into_iter()
            .next()
            .ok_or_else(|| IndexError::MissingArray {
                name: array_name.to_string(),
            })?,
    };

    tensor_to_rows(&tensor)
}

/// Flattens a 2-D (or singleton-middle 3-D) tensor into `f32` rows.
pub fn tensor_to_rows(tensor: &Tensor) -> IndexResult<(Vec<f32>, usize, usize)> {
    let (rows, cols) = match *tensor.dims() {
        [rows, cols] => (rows, cols),
        [rows, 1, cols] => (rows, cols),
        ref other => {
            return Err(IndexError::InvalidShape {
                shape: other.to_vec(),
            });
        }
    };

    let data = tensor
        .to_dtype(DType::F32)?
        .flatten_all()?
        .to_vec1::<f32>()?;
    Ok((data, rows, cols))
}

/// Writes `data` as an `f32` `(rows, cols)` array, named `array_name` inside an `.npz`.
pub fn write_matrix(
    path: &Path,
    array_name: &str,
    data: &[f32],
    rows: usize,
    cols: usize,
) -> IndexResult<()> {
    let tensor = Tensor::from_slice(data, (rows, cols), &Device::Cpu)?;
    match MatrixFormat::from_path(path) {
        MatrixFormat::Npy => tensor.write_npy(path)?,
        MatrixFormat::Npz => Tensor::write_npz(&[(array_name, &tensor)], path)?,
    }
    Ok(())
}
