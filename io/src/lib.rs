mod error;
mod medial;
mod metadata;
mod npy;

pub use error::{Error, Result};
pub use medial::write_medial_result;
pub use metadata::write_metadata;
pub use npy::{read_normals, read_points, write_normals, write_points, write_qidx};
