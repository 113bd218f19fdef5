use std::path::Path;

use masb_common::{Error as CoreError, NormalField, Point3, PointCloud};
use ndarray::{Array1, Array2};
use ndarray_npy::{read_npy, write_npy};

use crate::error::{Error, Result};

/// Reads `coords.npy`: an N×3 little-endian float32 array (spec §6).
pub fn read_points(path: &Path) -> Result<PointCloud<Point3<f32>>> {
    let flat = read_flat(path)?;
    PointCloud::from_flat(&flat)
        .map_err(|source| Error::Shape { path: path.to_owned(), source })
}

/// Reads `normals.npy`: an N×3 little-endian float32 array (spec §6).
pub fn read_normals(path: &Path) -> Result<NormalField> {
    let flat = read_flat(path)?;
    NormalField::from_flat(&flat)
        .map_err(|source| Error::Shape { path: path.to_owned(), source })
}

/// Reads and shape-validates an N×3 array, returning it flattened to the
/// row-major buffer `PointCloud::from_flat` expects.
fn read_flat(path: &Path) -> Result<Vec<f32>> {
    let array: Array2<f32> =
        read_npy(path).map_err(|source| Error::ReadNpy { path: path.to_owned(), source })?;
    if array.ncols() != 3 {
        return Err(Error::Shape {
            path: path.to_owned(),
            source: CoreError::InvalidShape { rows: array.nrows(), cols: array.ncols() },
        });
    }
    Ok(array.as_standard_layout().iter().copied().collect())
}

/// Writes `coords.npy`/`ma_coords_{in,out}.npy`: an N×3 float32 array
/// built from `cloud.to_flat()` (spec §6).
pub fn write_points(path: &Path, cloud: &PointCloud<Point3<f32>>) -> Result<()> {
    write_flat(path, cloud.len(), cloud.to_flat())
}

/// Writes `normals.npy`: an N×3 float32 array built from
/// `field.to_flat()` (spec §6).
pub fn write_normals(path: &Path, field: &NormalField) -> Result<()> {
    write_flat(path, field.len(), field.to_flat())
}

fn write_flat(path: &Path, rows: usize, flat: Vec<f32>) -> Result<()> {
    let array = Array2::from_shape_vec((rows, 3), flat)
        .expect("to_flat() always produces rows*3 elements");
    write_npy(path, &array).map_err(|source| Error::WriteNpy { path: path.to_owned(), source })
}

/// Writes an N int32 array, used for `ma_qidx_in.npy`/`ma_qidx_out.npy`
/// (spec §6).
pub fn write_qidx(path: &Path, qidx: &[u32]) -> Result<()> {
    let array: Array1<i32> = qidx.iter().map(|&q| q as i32).collect();
    write_npy(path, &array).map_err(|source| Error::WriteNpy { path: path.to_owned(), source })
}
