// ============================================================================
// ADJUSTMENT OPERATIONS — per-pixel colour effects, whiteout and crop
// ============================================================================
//
// Every transform works on a PixelRegion copied out of the surface; the
// session writes the result back. Rows are processed in parallel via rayon.
// ============================================================================

use std::fmt;
use std::str::FromStr;

use image::Rgba;
use rayon::prelude::*;

use crate::canvas::{BYTES_PER_PIXEL, PixelRect, PixelRegion, RasterSurface};
use crate::error::EditError;

/// Colour used by delete.
pub const WHITEOUT: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Colour effects selectable by the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    Grayscale,
    Sepia,
    Invert,
}

impl Effect {
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Grayscale => "grayscale",
            Effect::Sepia => "sepia",
            Effect::Invert => "invert",
        }
    }

    pub fn all() -> &'static [Effect] {
        &[Effect::Grayscale, Effect::Sepia, Effect::Invert]
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Effect {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Effect::all()
            .iter()
            .copied()
            .find(|e| e.name() == wanted)
            .ok_or_else(|| EditError::InvalidCommand(format!("unknown effect '{}'", s)))
    }
}

// ============================================================================
// HELPER: per-pixel transform over a region
// ============================================================================

/// Apply a per-pixel transform to every pixel of `region`.
/// `transform` receives (r, g, b, a) as f32 and returns (r, g, b, a) as f32;
/// results are rounded and saturated to 0..=255.
pub fn apply_pixel_transform<F>(region: &mut PixelRegion, transform: F)
where
    F: Fn(f32, f32, f32, f32) -> (f32, f32, f32, f32) + Sync,
{
    let stride = region.width() as usize * BYTES_PER_PIXEL;
    if stride == 0 {
        return;
    }

    region.as_raw_mut().par_chunks_mut(stride).for_each(|row| {
        for px in row.chunks_exact_mut(BYTES_PER_PIXEL) {
            let (nr, ng, nb, na) =
                transform(px[0] as f32, px[1] as f32, px[2] as f32, px[3] as f32);
            px[0] = nr.round().clamp(0.0, 255.0) as u8;
            px[1] = ng.round().clamp(0.0, 255.0) as u8;
            px[2] = nb.round().clamp(0.0, 255.0) as u8;
            px[3] = na.round().clamp(0.0, 255.0) as u8;
        }
    });
}

/// Run `effect` over the region in place.
pub fn apply_effect(region: &mut PixelRegion, effect: Effect) {
    match effect {
        Effect::Grayscale => grayscale(region),
        Effect::Sepia => sepia(region),
        Effect::Invert => invert_colors(region),
    }
}

/// Unweighted mean of R, G and B. Alpha is preserved.
pub fn grayscale(region: &mut PixelRegion) {
    apply_pixel_transform(region, |r, g, b, a| {
        let avg = (r + g + b) / 3.0;
        (avg, avg, avg, a)
    });
}

/// Apply a sepia tone effect, saturating at 255.
pub fn sepia(region: &mut PixelRegion) {
    apply_pixel_transform(region, |r, g, b, a| {
        let sr = 0.393 * r + 0.769 * g + 0.189 * b;
        let sg = 0.349 * r + 0.686 * g + 0.168 * b;
        let sb = 0.272 * r + 0.534 * g + 0.131 * b;
        (sr, sg, sb, a)
    });
}

/// Invert all color channels (R, G, B). Alpha is preserved.
pub fn invert_colors(region: &mut PixelRegion) {
    apply_pixel_transform(region, |r, g, b, a| (255.0 - r, 255.0 - g, 255.0 - b, a));
}

/// Set R, G and B of every pixel to white, leaving alpha untouched.
pub fn whiteout(region: &mut PixelRegion) {
    for px in region.as_raw_mut().chunks_exact_mut(BYTES_PER_PIXEL) {
        px[0] = WHITEOUT[0];
        px[1] = WHITEOUT[1];
        px[2] = WHITEOUT[2];
    }
}

// ============================================================================
// CROP
// ============================================================================

/// A new surface holding exactly the pixels inside `rect`.
pub fn crop_to_rect(surface: &RasterSurface, rect: PixelRect) -> RasterSurface {
    RasterSurface::from_image(surface.read_region(rect).into_image())
}
