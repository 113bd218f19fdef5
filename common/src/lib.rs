pub mod error;
pub mod params;
pub mod point_cloud;
pub mod search;

pub use error::{Error, Result};
pub use nalgebra::{Point3, Vector3};
pub use params::{NormalParams, ShrinkParams};
pub use point_cloud::{NormalField, PointCloud};
pub use search::SpatialIndex;
