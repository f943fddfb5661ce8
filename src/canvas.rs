use image::{Rgba, RgbaImage, imageops};

/// RGBA samples per pixel.
pub const BYTES_PER_PIXEL: usize = 4;

// ============================================================================
// SELECTION SYSTEM
// ============================================================================

/// A rectangle in surface coordinates as produced by a pointer drag.
///
/// Width and height may be negative while the drag is live; call
/// [`SelectionRect::normalized`] to get a top-left anchored rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl SelectionRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle spanned by a drag from the anchor `(sx, sy)` to the current
    /// pointer position `(cx, cy)`.
    pub fn from_drag(sx: i32, sy: i32, cx: i32, cy: i32) -> Self {
        Self::new(sx, sy, cx.saturating_sub(sx), cy.saturating_sub(sy))
    }

    /// Flip negative extents so the rectangle is anchored at its top-left
    /// corner with non-negative width and height.
    pub fn normalized(self) -> Self {
        let mut r = self;
        if r.width < 0 {
            r.x = r.x.saturating_add(r.width);
            r.width = r.width.saturating_neg();
        }
        if r.height < 0 {
            r.y = r.y.saturating_add(r.height);
            r.height = r.height.saturating_neg();
        }
        r
    }

    pub fn is_normalized(&self) -> bool {
        self.width >= 0 && self.height >= 0
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Normalize, then intersect with a `surface_w × surface_h` surface.
    /// Returns `None` when no pixel of the surface remains selected.
    pub fn clamp_to(&self, surface_w: u32, surface_h: u32) -> Option<PixelRect> {
        let r = self.normalized();
        let x0 = (r.x as i64).max(0);
        let y0 = (r.y as i64).max(0);
        let x1 = (r.x as i64 + r.width as i64).min(surface_w as i64);
        let y1 = (r.y as i64 + r.height as i64).min(surface_h as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(PixelRect {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

/// A non-empty rectangle of surface pixels, already clamped to the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Turns pointer down / move / up events into a selection rectangle.
#[derive(Clone, Debug, Default)]
pub struct SelectionTracker {
    anchor: Option<(i32, i32)>,
    live: Option<SelectionRect>,
}

impl SelectionTracker {
    /// Pointer pressed: record the anchor and publish an empty rectangle there.
    pub fn begin(&mut self, x: i32, y: i32) -> SelectionRect {
        let rect = SelectionRect::new(x, y, 0, 0);
        self.anchor = Some((x, y));
        self.live = Some(rect);
        rect
    }

    /// Pointer moved. Returns the live (possibly negative-sized) rectangle,
    /// or `None` when no drag is in progress.
    pub fn update(&mut self, x: i32, y: i32) -> Option<SelectionRect> {
        let (sx, sy) = self.anchor?;
        let rect = SelectionRect::from_drag(sx, sy, x, y);
        self.live = Some(rect);
        Some(rect)
    }

    /// Pointer released. Ends the drag and returns the normalized rectangle.
    pub fn finish(&mut self) -> Option<SelectionRect> {
        self.anchor.take()?;
        self.live.take().map(SelectionRect::normalized)
    }

    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn cancel(&mut self) {
        self.anchor = None;
        self.live = None;
    }
}

// ============================================================================
// PIXEL REGION
// ============================================================================

/// A copy of the RGBA samples inside a rectangle of the surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelRegion {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelRegion {
    /// Region filled with a single colour.
    pub fn filled(width: u32, height: u32, color: Rgba<u8>) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * BYTES_PER_PIXEL);
        for _ in 0..count {
            data.extend_from_slice(&color.0);
        }
        Self { width, height, data }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height, data: image.into_raw() }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Iterate pixels as `[r, g, b, a]` slices in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(BYTES_PER_PIXEL)
    }

    pub fn into_image(self) -> RgbaImage {
        let (w, h) = (self.width, self.height);
        RgbaImage::from_raw(w, h, self.data).unwrap_or_else(|| RgbaImage::new(w, h))
    }
}

// ============================================================================
// RASTER SURFACE
// ============================================================================

/// The working bitmap the user edits.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    /// Fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self { image: RgbaImage::new(width, height) }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Draw `src` scaled into a fresh `width × height` surface.
    pub fn scaled_from(src: &RgbaImage, width: u32, height: u32, filter: imageops::FilterType) -> Self {
        if src.dimensions() == (width, height) {
            return Self { image: src.clone() };
        }
        Self { image: imageops::resize(src, width, height, filter) }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn as_image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Copy the samples inside `rect` out of the surface.
    /// Parts of `rect` beyond the surface edge are dropped.
    pub fn read_region(&self, rect: PixelRect) -> PixelRegion {
        let (sw, sh) = self.dimensions();
        let x0 = rect.x.min(sw);
        let y0 = rect.y.min(sh);
        let w = rect.width.min(sw - x0);
        let h = rect.height.min(sh - y0);

        let src = self.image.as_raw();
        let stride = sw as usize * BYTES_PER_PIXEL;
        let row_len = w as usize * BYTES_PER_PIXEL;
        let mut data = Vec::with_capacity(row_len * h as usize);
        for y in y0..y0 + h {
            let start = y as usize * stride + x0 as usize * BYTES_PER_PIXEL;
            data.extend_from_slice(&src[start..start + row_len]);
        }
        PixelRegion { width: w, height: h, data }
    }

    /// Write `region` back with its top-left corner at `(x, y)`, clipped to
    /// the surface.
    pub fn write_region(&mut self, region: &PixelRegion, x: u32, y: u32) {
        let (sw, sh) = self.dimensions();
        if x >= sw || y >= sh {
            return;
        }
        let w = region.width.min(sw - x) as usize;
        let h = region.height.min(sh - y) as usize;
        let stride = sw as usize * BYTES_PER_PIXEL;
        let src_stride = region.width as usize * BYTES_PER_PIXEL;
        let row_len = w * BYTES_PER_PIXEL;

        let dst: &mut [u8] = &mut self.image;
        for row in 0..h {
            let d = (y as usize + row) * stride + x as usize * BYTES_PER_PIXEL;
            let s = row * src_stride;
            dst[d..d + row_len].copy_from_slice(&region.data[s..s + row_len]);
        }
    }

    /// Copy of the surface with a rectangle outline stroked on top.
    /// The stroke is centred on the rectangle edge, as a canvas `stroke()` is.
    pub fn with_outline(&self, rect: SelectionRect, color: Rgba<u8>, line_width: u32) -> RgbaImage {
        let mut out = self.image.clone();
        let r = rect.normalized();
        let half = (line_width / 2) as i64;
        let lw = line_width.max(1) as i64;
        let (x0, y0) = (r.x as i64 - half, r.y as i64 - half);
        let (x1, y1) = (r.x as i64 + r.width as i64 - half, r.y as i64 + r.height as i64 - half);
        let outer_w = x1 - x0 + lw;
        let outer_h = y1 - y0 + lw;

        fill_rect(&mut out, x0, y0, outer_w, lw, color);
        fill_rect(&mut out, x0, y1, outer_w, lw, color);
        fill_rect(&mut out, x0, y0, lw, outer_h, color);
        fill_rect(&mut out, x1, y0, lw, outer_h, color);
        out
    }
}

/// Fill a rectangle on `img`, clipped to its bounds.
fn fill_rect(img: &mut RgbaImage, x: i64, y: i64, w: i64, h: i64, color: Rgba<u8>) {
    let (iw, ih) = (img.width() as i64, img.height() as i64);
    let xs = x.max(0);
    let ys = y.max(0);
    let xe = (x + w).min(iw);
    let ye = (y + h).min(ih);
    for py in ys..ye {
        for px in xs..xe {
            img.put_pixel(px as u32, py as u32, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> RasterSurface {
        RasterSurface::from_image(RgbaImage::from_fn(w, h, |x, y| {
            Rgba([x as u8, y as u8, (x + y) as u8, 200])
        }))
    }

    #[test]
    fn drag_up_left_normalizes_to_top_left() {
        let r = SelectionRect::from_drag(50, 40, 10, 5).normalized();
        assert_eq!(r, SelectionRect::new(10, 5, 40, 35));
    }

    #[test]
    fn normalization_anchor_is_corner_minimum() {
        let points = [(0, 0), (7, 3), (-4, 12), (25, -6), (13, 13)];
        for &(sx, sy) in &points {
            for &(cx, cy) in &points {
                let r = SelectionRect::from_drag(sx, sy, cx, cy).normalized();
                assert!(r.is_normalized());
                assert_eq!((r.x, r.y), (sx.min(cx), sy.min(cy)));
                assert_eq!((r.width, r.height), ((cx - sx).abs(), (cy - sy).abs()));
            }
        }
    }

    #[test]
    fn clamp_trims_to_surface_edges() {
        let r = SelectionRect::new(-5, 90, 20, 30);
        let clamped = r.clamp_to(100, 100).unwrap();
        assert_eq!(clamped, PixelRect { x: 0, y: 90, width: 15, height: 10 });
    }

    #[test]
    fn clamp_rejects_zero_area_and_offsurface() {
        assert!(SelectionRect::new(10, 10, 0, 5).clamp_to(100, 100).is_none());
        assert!(SelectionRect::new(120, 10, 5, 5).clamp_to(100, 100).is_none());
        assert!(SelectionRect::new(-20, -20, 10, 10).clamp_to(100, 100).is_none());
    }

    #[test]
    fn tracker_ignores_moves_without_anchor() {
        let mut t = SelectionTracker::default();
        assert!(t.update(5, 5).is_none());
        assert!(t.finish().is_none());

        t.begin(10, 10);
        assert_eq!(t.update(4, 16), Some(SelectionRect::new(10, 10, -6, 6)));
        assert_eq!(t.finish(), Some(SelectionRect::new(4, 10, 6, 6)));
        assert!(!t.is_dragging());
    }

    #[test]
    fn read_then_write_region_is_lossless() {
        let mut surface = gradient(16, 12);
        let rect = PixelRect { x: 3, y: 2, width: 5, height: 4 };
        let region = surface.read_region(rect);
        assert_eq!(region.pixel_count(), 20);
        assert_eq!(&region.as_raw()[..4], &[3, 2, 5, 200]);

        let before = surface.clone();
        surface.write_region(&region, 3, 2);
        assert_eq!(surface, before);
    }

    #[test]
    fn write_region_clips_at_edges() {
        let mut surface = RasterSurface::new(4, 4);
        let white = PixelRegion::filled(3, 3, Rgba([255, 255, 255, 255]));
        surface.write_region(&white, 2, 2);
        assert_eq!(*surface.as_image().get_pixel(3, 3), Rgba([255, 255, 255, 255]));
        assert_eq!(*surface.as_image().get_pixel(1, 1), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn outline_leaves_surface_untouched() {
        let surface = RasterSurface::new(20, 20);
        let red = Rgba([255, 0, 0, 255]);
        let preview = surface.with_outline(SelectionRect::new(5, 5, 10, 10), red, 2);
        assert_eq!(*preview.get_pixel(5, 5), red);
        assert_eq!(*preview.get_pixel(10, 10), Rgba([0, 0, 0, 0]));
        assert_eq!(*surface.as_image().get_pixel(5, 5), Rgba([0, 0, 0, 0]));
    }
}
