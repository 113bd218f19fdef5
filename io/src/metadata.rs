use std::{fs::File, io::Write, path::Path};

use masb_common::ShrinkParams;

use crate::error::{Error, Result};

/// Writes the `compute_ma` key/value metadata sidecar file (spec §6).
///
/// Angles are recorded in the same radians the core ran with; the
/// degrees a user typed on the command line are a `masb-cli` concern,
/// not something this crate has any record of.
pub fn write_metadata(path: &Path, params: &ShrinkParams) -> Result<()> {
    let mut file = File::create(path).map_err(|source| Error::Io { path: path.to_owned(), source })?;
    writeln!(file, "initial_radius {}", params.initial_radius)
        .and_then(|_| writeln!(file, "nan_for_initr {}", params.nan_for_initr))
        .and_then(|_| writeln!(file, "denoise_preserve {}", params.denoise_preserve))
        .and_then(|_| writeln!(file, "denoise_planar {}", params.denoise_planar))
        .map_err(|source| Error::Io { path: path.to_owned(), source })
}
