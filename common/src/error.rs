use thiserror::Error;

/// Programmer errors: bad shapes or bad parameters. Data conditions
/// (degenerate balls, numeric edge cases) are never represented here —
/// per the core's contract they are carried in the output data instead,
/// see [`crate::params::ShrinkParams`] and the `qidx` sentinel convention.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum Error {
    #[error("expected an Nx3 array, found {rows}x{cols}")]
    InvalidShape { rows: usize, cols: usize },
    #[error("normals length ({normals}) does not match points length ({points})")]
    LengthMismatch { points: usize, normals: usize },
    #[error("initial_radius must be positive, got {0}")]
    InvalidInitialRadius(f32),
    #[error("denoise angle must be non-negative, got {0}")]
    InvalidAngle(f32),
    #[error("k must be positive")]
    InvalidK,
}

pub type Result<T> = std::result::Result<T, Error>;
