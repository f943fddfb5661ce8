// ============================================================================
// TRANSFORM OPERATIONS — whole-image scaling
// ============================================================================

use std::fmt;
use std::str::FromStr;

use image::imageops;

use crate::error::EditError;

/// Largest surface side, in pixels.
pub const MAX_SURFACE_DIM: u32 = 16_384;

/// Largest surface area, in pixels (256 MiB of RGBA).
pub const MAX_SURFACE_PIXELS: u64 = 64 * 1024 * 1024;

/// Interpolation method for resize operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Interpolation {
    Nearest,
    #[default]
    Bilinear,
    Bicubic,
    Lanczos3,
}

impl Interpolation {
    pub fn name(&self) -> &'static str {
        match self {
            Interpolation::Nearest => "nearest",
            Interpolation::Bilinear => "bilinear",
            Interpolation::Bicubic => "bicubic",
            Interpolation::Lanczos3 => "lanczos3",
        }
    }

    pub fn all() -> &'static [Interpolation] {
        &[
            Interpolation::Nearest,
            Interpolation::Bilinear,
            Interpolation::Bicubic,
            Interpolation::Lanczos3,
        ]
    }

    pub fn to_filter(&self) -> imageops::FilterType {
        match self {
            Interpolation::Nearest => imageops::FilterType::Nearest,
            Interpolation::Bilinear => imageops::FilterType::Triangle,
            Interpolation::Bicubic => imageops::FilterType::CatmullRom,
            Interpolation::Lanczos3 => imageops::FilterType::Lanczos3,
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Interpolation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Interpolation::all()
            .iter()
            .copied()
            .find(|i| i.name() == wanted)
            .ok_or_else(|| format!("unknown interpolation '{}'", s))
    }
}

/// Work out the target size of a scale from the user's two inputs.
///
/// Zero counts as unset. Exactly one side must be given; the other follows the
/// `reference_w × reference_h` aspect ratio, truncated and at least 1.
pub fn resolve_scale_dimensions(
    reference_w: u32,
    reference_h: u32,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<(u32, u32), EditError> {
    let width = width.filter(|&w| w > 0);
    let height = height.filter(|&h| h > 0);
    if reference_w == 0 || reference_h == 0 {
        return Err(EditError::InvalidScaleInput);
    }

    match (width, height) {
        (Some(w), None) => {
            let h = (w as u64 * reference_h as u64 / reference_w as u64).max(1);
            check_surface_size(w as u64, h)
        }
        (None, Some(h)) => {
            let w = (h as u64 * reference_w as u64 / reference_h as u64).max(1);
            check_surface_size(w, h as u64)
        }
        _ => Err(EditError::InvalidScaleInput),
    }
}

/// Surface size for an image loaded at `1 / divisor` of its native size.
/// A divisor that is not a positive number counts as 1.
pub fn load_dimensions(
    native_w: u32,
    native_h: u32,
    divisor: f32,
) -> Result<(u32, u32), EditError> {
    let divisor = if divisor.is_finite() && divisor > 0.0 { divisor as f64 } else { 1.0 };
    // Float-to-int casts saturate, so a tiny divisor lands on u64::MAX and is rejected below.
    let w = ((native_w as f64 / divisor) as u64).max(1);
    let h = ((native_h as f64 / divisor) as u64).max(1);
    check_surface_size(w, h)
}

/// Reject sizes no surface may be allocated at.
pub fn check_surface_size(width: u64, height: u64) -> Result<(u32, u32), EditError> {
    let max = MAX_SURFACE_DIM as u64;
    if width > max || height > max || width * height > MAX_SURFACE_PIXELS {
        return Err(EditError::SurfaceTooLarge { width, height });
    }
    Ok((width as u32, height as u32))
}
