use crate::error::{Error, Result};

/// Parameters for the shrinking-ball stage (spec §3, §4.3).
///
/// Angles are always in radians by the time they reach this type; the
/// driver is responsible for converting from degrees (spec §6).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShrinkParams {
    pub initial_radius: f32,
    pub denoise_preserve: f32,
    pub denoise_planar: f32,
    pub nan_for_initr: bool,
}

impl ShrinkParams {
    /// `delta_convergance` in the original implementation.
    pub const CONVERGENCE_DELTA: f32 = 1e-5;
    /// `iteration_limit` in the original implementation.
    pub const ITERATION_LIMIT: u32 = 30;

    pub fn new(
        initial_radius: f32,
        denoise_preserve: f32,
        denoise_planar: f32,
        nan_for_initr: bool,
    ) -> Result<Self> {
        if !(initial_radius > 0.0) {
            return Err(Error::InvalidInitialRadius(initial_radius));
        }
        if denoise_preserve < 0.0 {
            return Err(Error::InvalidAngle(denoise_preserve));
        }
        if denoise_planar < 0.0 {
            return Err(Error::InvalidAngle(denoise_planar));
        }
        Ok(ShrinkParams {
            initial_radius,
            denoise_preserve,
            denoise_planar,
            nan_for_initr,
        })
    }
}

impl Default for ShrinkParams {
    /// Mirrors masbcpp's defaults: `initial_radius = 100`,
    /// `denoise_preserve = 20deg`, `denoise_planar = 74deg`.
    fn default() -> Self {
        ShrinkParams::new(100.0, 20f32.to_radians(), 74f32.to_radians(), false).unwrap()
    }
}

/// Parameters for PCA normal estimation (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalParams {
    pub k: usize,
    pub kd_tree_reorder: bool,
}

impl NormalParams {
    pub fn new(k: usize, kd_tree_reorder: bool) -> Result<Self> {
        if k == 0 {
            return Err(Error::InvalidK);
        }
        Ok(NormalParams { k, kd_tree_reorder })
    }
}

impl Default for NormalParams {
    fn default() -> Self {
        NormalParams::new(10, true).unwrap()
    }
}
