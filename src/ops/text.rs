use std::path::Path;

use ab_glyph::{point, Font, FontArc, GlyphId, ScaleFont};
use image::RgbaImage;

use crate::error::EditError;

/// Family requested first when looking up a system font.
pub const DEFAULT_FONT_FAMILY: &str = "Arial";

/// Text stamp request as entered by the user. Numeric fields left blank are
/// `None`; zero counts as blank.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub text: String,
    pub font_size: Option<u32>,
    pub color: [u8; 4],
    pub x: Option<u32>,
    pub y: Option<u32>,
}

/// A validated stamp: non-empty text, positive size and position.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStamp<'a> {
    pub text: &'a str,
    pub font_size: f32,
    pub color: [u8; 4],
    pub x: f32,
    pub y: f32,
}

impl TextStyle {
    pub fn validate(&self) -> Result<TextStamp<'_>, EditError> {
        if self.text.is_empty() {
            return Err(EditError::InvalidTextInput("You have to add some text!".into()));
        }
        let positive = |v: Option<u32>| v.filter(|&n| n > 0);
        match (positive(self.font_size), positive(self.x), positive(self.y)) {
            (Some(size), Some(x), Some(y)) => Ok(TextStamp {
                text: &self.text,
                font_size: size as f32,
                color: self.color,
                x: x as f32,
                y: y as f32,
            }),
            _ => Err(EditError::InvalidTextInput(
                "You have to provide a font size and XY positions!".into(),
            )),
        }
    }
}

/// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional).
pub fn parse_color(s: &str) -> Option<[u8; 4]> {
    let hex = s.trim().trim_start_matches('#');
    if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let alpha = if hex.len() == 8 { byte(6)? } else { 255 };
    Some([byte(0)?, byte(2)?, byte(4)?, alpha])
}

/// Lay out a single line of text with its baseline at y = 0, starting at x = 0.
/// Returns `(glyphs, total_width)`.
pub fn layout_line(font: &FontArc, text: &str, font_size: f32) -> (Vec<(GlyphId, f32)>, f32) {
    let scaled = font.as_scaled(font_size);
    let mut glyphs = Vec::new();
    let mut cursor_x = 0.0f32;
    let mut last_glyph: Option<GlyphId> = None;

    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = last_glyph {
            cursor_x += scaled.kern(prev, glyph_id);
        }
        glyphs.push((glyph_id, cursor_x));
        cursor_x += scaled.h_advance(glyph_id);
        last_glyph = Some(glyph_id);
    }

    (glyphs, cursor_x)
}

/// Rasterize `stamp` and blend it over `image` (source-over, per-pixel coverage).
/// Glyph parts outside the image are clipped. Returns the number of pixels touched.
pub fn stamp_text(image: &mut RgbaImage, font: &FontArc, stamp: &TextStamp<'_>) -> usize {
    let (w, h) = image.dimensions();
    let line_height = font.as_scaled(stamp.font_size).height();

    // Coverage per pixel; overlapping glyph edges keep the strongest value.
    let mut coverage = vec![0.0f32; w as usize * h as usize];
    for (line_idx, line) in stamp.text.split('\n').enumerate() {
        let baseline = stamp.y + line_idx as f32 * line_height;
        let (glyphs, _) = layout_line(font, line, stamp.font_size);
        for (glyph_id, gx) in glyphs {
            let glyph = glyph_id.with_scale_and_position(
                stamp.font_size,
                point(stamp.x + gx, baseline),
            );
            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, cov| {
                let cx = bounds.min.x as i64 + px as i64;
                let cy = bounds.min.y as i64 + py as i64;
                if cx >= 0 && cy >= 0 && cx < w as i64 && cy < h as i64 {
                    let idx = cy as usize * w as usize + cx as usize;
                    coverage[idx] = coverage[idx].max(cov);
                }
            });
        }
    }

    let mut touched = 0;
    for (i, &cov) in coverage.iter().enumerate() {
        if cov <= 0.001 {
            continue;
        }
        let x = (i % w as usize) as u32;
        let y = (i / w as usize) as u32;
        let dst = image.get_pixel_mut(x, y);
        blend_over(&mut dst.0, stamp.color, cov);
        touched += 1;
    }
    touched
}

/// Source-over blend of `color` scaled by `coverage` onto `dst`.
fn blend_over(dst: &mut [u8; 4], color: [u8; 4], coverage: f32) {
    let sa = color[3] as f32 / 255.0 * coverage.min(1.0);
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }
    for c in 0..3 {
        let v = (color[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        dst[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Load a TrueType/OpenType font file.
pub fn load_font_file(path: &Path) -> Result<FontArc, EditError> {
    let bytes = std::fs::read(path)?;
    FontArc::try_from_vec(bytes).map_err(|_| EditError::FontUnavailable)
}

/// Load `family` (regular weight) from the system, falling back to any
/// sans-serif face. Returns None if no font can be found.
pub fn load_system_font(family: &str) -> Option<FontArc> {
    use font_kit::family_name::FamilyName;
    use font_kit::properties::Properties;
    use font_kit::source::SystemSource;

    let source = SystemSource::new();
    let handle = source
        .select_best_match(
            &[FamilyName::Title(family.to_string()), FamilyName::SansSerif],
            &Properties::new(),
        )
        .ok()?;

    let font_data = handle.load().ok()?;
    let bytes: Vec<u8> = (*font_data.copy_font_data()?).clone();
    FontArc::try_from_vec(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn style(text: &str, size: Option<u32>, x: Option<u32>, y: Option<u32>) -> TextStyle {
        TextStyle { text: text.into(), font_size: size, color: [0, 0, 0, 255], x, y }
    }

    #[test]
    fn empty_text_is_rejected() {
        let err = style("", Some(12), Some(5), Some(5)).validate().unwrap_err();
        assert_eq!(err.to_string(), "You have to add some text!");
    }

    #[test]
    fn zero_or_missing_numbers_are_rejected() {
        for s in [
            style("hi", None, Some(5), Some(5)),
            style("hi", Some(0), Some(5), Some(5)),
            style("hi", Some(12), Some(0), Some(5)),
            style("hi", Some(12), Some(5), None),
        ] {
            assert!(matches!(s.validate(), Err(EditError::InvalidTextInput(_))));
        }
        let ok = style("hi", Some(12), Some(3), Some(4));
        let stamp = ok.validate().unwrap();
        assert_eq!((stamp.font_size, stamp.x, stamp.y), (12.0, 3.0, 4.0));
    }

    #[test]
    fn colors_parse() {
        assert_eq!(parse_color("#ff8000"), Some([255, 128, 0, 255]));
        assert_eq!(parse_color("00000080"), Some([0, 0, 0, 128]));
        assert_eq!(parse_color("#fff"), None);
        assert_eq!(parse_color("#gg0000"), None);
    }

    #[test]
    fn blend_over_opaque_color_replaces() {
        let mut dst = [10, 20, 30, 255];
        blend_over(&mut dst, [200, 0, 0, 255], 1.0);
        assert_eq!(dst, [200, 0, 0, 255]);

        let mut half = [0, 0, 0, 255];
        blend_over(&mut half, [255, 255, 255, 255], 0.5);
        assert_eq!(half, [128, 128, 128, 255]);
    }

    #[test]
    fn stamp_marks_pixels_near_the_baseline() {
        let Some(font) = load_system_font(DEFAULT_FONT_FAMILY) else {
            eprintln!("no system font available, skipping");
            return;
        };
        let mut img = RgbaImage::from_pixel(120, 60, Rgba([255, 255, 255, 255]));
        let s = style("Hello", Some(24), Some(10), Some(40));
        let touched = stamp_text(&mut img, &font, &s.validate().unwrap());
        assert!(touched > 0);
        // Nothing is drawn left of the origin.
        assert!((0..60).all(|y| *img.get_pixel(0, y) == Rgba([255, 255, 255, 255])));
    }
}
