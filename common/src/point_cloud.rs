use std::ops::{Deref, DerefMut, Index, IndexMut};

use nalgebra::{Point3, Vector3};

use crate::error::{Error, Result};

/// An ordered, index-stable sequence of N three-dimensional values.
///
/// Used both for the input `PointCloud` (`P = Point3<f32>`) and the
/// `NormalField` (`P = Vector3<f32>`, see the [`NormalField`] alias):
/// both are "an ordered sequence of N points/vectors" per spec §3, and
/// share the same flat-buffer shape validation and index semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud<P> {
    storage: Vec<P>,
}

impl<P> PointCloud<P> {
    pub fn new() -> Self {
        PointCloud { storage: Vec::new() }
    }

    pub fn from_vec(storage: Vec<P>) -> Self {
        PointCloud { storage }
    }

    pub fn into_vec(self) -> Vec<P> {
        self.storage
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, P> {
        self.storage.iter()
    }

    pub fn push(&mut self, point: P) {
        self.storage.push(point);
    }
}

impl<P> Default for PointCloud<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Deref for PointCloud<P> {
    type Target = [P];

    fn deref(&self) -> &Self::Target {
        &self.storage
    }
}

impl<P> DerefMut for PointCloud<P> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.storage
    }
}

impl<P> Index<usize> for PointCloud<P> {
    type Output = P;

    fn index(&self, index: usize) -> &Self::Output {
        &self.storage[index]
    }
}

impl<P> IndexMut<usize> for PointCloud<P> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.storage[index]
    }
}

impl<P> FromIterator<P> for PointCloud<P> {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        PointCloud { storage: iter.into_iter().collect() }
    }
}

impl<P> IntoIterator for PointCloud<P> {
    type Item = P;
    type IntoIter = std::vec::IntoIter<P>;

    fn into_iter(self) -> Self::IntoIter {
        self.storage.into_iter()
    }
}

impl<'a, P> IntoIterator for &'a PointCloud<P> {
    type Item = &'a P;
    type IntoIter = std::slice::Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.storage.iter()
    }
}

/// An ordered sequence of N unit-length (up to rounding) normal vectors,
/// aligned by index with a [`PointCloud<Point3<f32>>`]. Orientation is an
/// input contract the core neither enforces nor flips (spec §3, §4.2).
pub type NormalField = PointCloud<Vector3<f32>>;

impl PointCloud<Point3<f32>> {
    /// Builds a cloud from a flat row-major N*3 buffer, the shape the
    /// `.npy` loader hands the core (spec §6 `coords.npy`).
    pub fn from_flat(data: &[f32]) -> Result<Self> {
        if data.len() % 3 != 0 {
            return Err(Error::InvalidShape { rows: data.len(), cols: 1 });
        }
        let storage = data
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();
        Ok(PointCloud { storage })
    }

    pub fn to_flat(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.storage.len() * 3);
        for p in &self.storage {
            out.extend_from_slice(&[p.x, p.y, p.z]);
        }
        out
    }
}

impl PointCloud<Vector3<f32>> {
    /// Builds a normal field from a flat row-major N*3 buffer
    /// (`normals.npy`). Does not renormalize or validate unit length —
    /// that is an input contract, not something the loader enforces.
    pub fn from_flat(data: &[f32]) -> Result<Self> {
        if data.len() % 3 != 0 {
            return Err(Error::InvalidShape { rows: data.len(), cols: 1 });
        }
        let storage = data
            .chunks_exact(3)
            .map(|c| Vector3::new(c[0], c[1], c[2]))
            .collect();
        Ok(PointCloud { storage })
    }

    pub fn to_flat(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.storage.len() * 3);
        for v in &self.storage {
            out.extend_from_slice(&[v.x, v.y, v.z]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_flat_rejects_non_multiple_of_three() {
        let err = PointCloud::<Point3<f32>>::from_flat(&[1.0, 2.0]).unwrap_err();
        assert_eq!(err, Error::InvalidShape { rows: 2, cols: 1 });
    }

    #[test]
    fn from_flat_round_trips() {
        let data = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let cloud = PointCloud::<Point3<f32>>::from_flat(&data).unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud[1], Point3::new(3.0, 4.0, 5.0));
        assert_eq!(cloud.to_flat(), data);
    }

    #[test]
    fn empty_input_yields_empty_cloud() {
        let cloud = PointCloud::<Point3<f32>>::from_flat(&[]).unwrap();
        assert!(cloud.is_empty());
    }
}
