// ============================================================================
// EDITOR SESSION — owns the surface, selection and restore log
// ============================================================================
//
// Every user action arrives as a `Command` and goes through `dispatch`.
// A command is validated before anything is touched, so a rejected command
// leaves the session exactly as it was.
// ============================================================================

use std::fmt;

use ab_glyph::FontArc;
use image::{Rgba, RgbaImage};

use crate::canvas::{PixelRect, RasterSurface, SelectionRect, SelectionTracker};
use crate::command::Command;
use crate::error::{EditError, Operation};
use crate::history::{RestoreEntry, RestoreLog};
use crate::ops::adjustments::{self, Effect};
use crate::ops::histogram::HistogramSet;
use crate::ops::text::{self, TextStyle};
use crate::ops::transform::{self, Interpolation};

/// Colour and width of the selection outline in previews.
pub const OUTLINE_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const OUTLINE_WIDTH: u32 = 2;

#[derive(Clone)]
pub struct EditorSession {
    /// Last committed image; the surface is redrawn from it.
    base: RgbaImage,
    surface: RasterSurface,
    selection: Option<SelectionRect>,
    tracker: SelectionTracker,
    histogram: Option<HistogramSet>,
    restore_log: RestoreLog,
    font: Option<FontArc>,
    interpolation: Interpolation,
}

impl fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("base", &self.base.dimensions())
            .field("surface", &self.surface.dimensions())
            .field("selection", &self.selection)
            .field("restore_entries", &self.restore_log.len())
            .field("has_font", &self.font.is_some())
            .field("interpolation", &self.interpolation)
            .finish()
    }
}

impl EditorSession {
    /// Session whose surface shows `image` at its native size.
    pub fn new(image: RgbaImage) -> Self {
        let (w, h) = image.dimensions();
        Self::with_surface_size(image, w, h, Interpolation::default())
    }

    /// Session whose surface shows `base` drawn into `width × height`.
    /// `interpolation` is used for that drawing and for every later redraw.
    pub fn with_surface_size(
        base: RgbaImage,
        width: u32,
        height: u32,
        interpolation: Interpolation,
    ) -> Self {
        let surface = RasterSurface::scaled_from(&base, width, height, interpolation.to_filter());
        Self {
            base,
            surface,
            selection: None,
            tracker: SelectionTracker::default(),
            histogram: None,
            restore_log: RestoreLog::default(),
            font: None,
            interpolation,
        }
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    pub fn base(&self) -> &RgbaImage {
        &self.base
    }

    /// The active selection; negative-sized while a drag is in progress.
    pub fn selection(&self) -> Option<SelectionRect> {
        self.selection
    }

    pub fn is_selecting(&self) -> bool {
        self.tracker.is_dragging()
    }

    /// Histogram of the active selection, if any.
    pub fn histogram(&self) -> Option<&HistogramSet> {
        self.histogram.as_ref()
    }

    pub fn restore_log(&self) -> &RestoreLog {
        &self.restore_log
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    // ========================================================================
    // COMMAND DISPATCH
    // ========================================================================

    /// Apply one user action. On error nothing has changed.
    pub fn dispatch(&mut self, command: Command) -> Result<(), EditError> {
        let name = command.name();
        let result = self.apply(command);
        if let Err(e) = &result {
            log_warn!("{} rejected: {}", name, e);
        }
        result
    }

    /// Apply commands in order, stopping at the first rejection.
    pub fn run<I>(&mut self, commands: I) -> Result<(), EditError>
    where
        I: IntoIterator<Item = Command>,
    {
        for command in commands {
            self.dispatch(command)?;
        }
        Ok(())
    }

    fn apply(&mut self, command: Command) -> Result<(), EditError> {
        match command {
            Command::PointerDown { x, y } => {
                self.selection = Some(self.tracker.begin(x, y));
                self.refresh_histogram();
            }
            Command::PointerMove { x, y } => {
                if let Some(rect) = self.tracker.update(x, y) {
                    self.selection = Some(rect);
                    self.refresh_histogram();
                }
            }
            Command::PointerUp => {
                if let Some(rect) = self.tracker.finish() {
                    log_info!("selected {}x{} at ({}, {})", rect.width, rect.height, rect.x, rect.y);
                    self.selection = Some(rect);
                    self.refresh_histogram();
                }
            }
            Command::Deselect => self.clear_selection(),
            Command::Crop => self.crop()?,
            Command::ApplyEffect(effect) => self.apply_effect(effect)?,
            Command::Delete => self.delete()?,
            Command::RestoreDeleted => self.restore_deleted(),
            Command::Scale { width, height } => self.scale(width, height)?,
            Command::AddText(style) => self.add_text(&style)?,
        }
        Ok(())
    }

    // ========================================================================
    // REGION OPERATIONS
    // ========================================================================

    fn crop(&mut self) -> Result<(), EditError> {
        let rect = self.selected_rect(Operation::Crop)?;
        self.redraw();
        self.surface = adjustments::crop_to_rect(&self.surface, rect);
        self.commit();
        // Old coordinates mean nothing on the cropped surface.
        self.restore_log.clear();
        self.clear_selection();
        log_info!("cropped to {}x{}", rect.width, rect.height);
        Ok(())
    }

    fn apply_effect(&mut self, effect: Effect) -> Result<(), EditError> {
        let rect = self.selected_rect(Operation::Effect)?;
        self.redraw();
        let mut region = self.surface.read_region(rect);
        adjustments::apply_effect(&mut region, effect);
        self.surface.write_region(&region, rect.x, rect.y);
        self.commit();
        self.clear_selection();
        log_info!("{} applied to {} pixels", effect, rect.pixel_count());
        Ok(())
    }

    fn delete(&mut self) -> Result<(), EditError> {
        let rect = self.selected_rect(Operation::Delete)?;
        let original = self.surface.read_region(rect);
        let mut whiteout = original.clone();
        adjustments::whiteout(&mut whiteout);
        self.surface.write_region(&whiteout, rect.x, rect.y);
        self.restore_log.push(RestoreEntry { x: rect.x, y: rect.y, whiteout, original });
        self.clear_selection();
        log_info!(
            "deleted {}x{} at ({}, {}); restore log holds {} entries ({} bytes)",
            rect.width,
            rect.height,
            rect.x,
            rect.y,
            self.restore_log.len(),
            self.restore_log.memory_size()
        );
        Ok(())
    }

    fn restore_deleted(&mut self) {
        if self.restore_log.is_empty() {
            return;
        }
        let count = self.restore_log.restore(&mut self.surface);
        self.commit();
        self.refresh_histogram();
        log_info!("restored {} deleted regions", count);
    }

    fn scale(&mut self, width: Option<u32>, height: Option<u32>) -> Result<(), EditError> {
        let (base_w, base_h) = self.base.dimensions();
        let (new_w, new_h) = transform::resolve_scale_dimensions(base_w, base_h, width, height)?;

        // Bake pending deletions so they survive the redraw.
        if !self.restore_log.is_empty() {
            self.commit();
            self.restore_log.clear();
        }
        self.surface =
            RasterSurface::scaled_from(&self.base, new_w, new_h, self.interpolation.to_filter());
        self.clear_selection();
        log_info!("scaled to {}x{} ({})", new_w, new_h, self.interpolation);
        Ok(())
    }

    fn add_text(&mut self, style: &TextStyle) -> Result<(), EditError> {
        let stamp = style.validate()?;
        let font = self.font.as_ref().ok_or(EditError::FontUnavailable)?;
        let touched = text::stamp_text(self.surface.as_image_mut(), font, &stamp);
        self.commit();
        self.refresh_histogram();
        log_info!("text stamped at ({}, {}), {} pixels", stamp.x, stamp.y, touched);
        Ok(())
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    /// The active selection clamped to the surface. Ends any drag in progress.
    fn selected_rect(&mut self, op: Operation) -> Result<PixelRect, EditError> {
        let selection = self.selection.ok_or(EditError::MissingSelection(op))?;
        let (w, h) = self.surface.dimensions();
        let rect = selection.clamp_to(w, h).ok_or(EditError::EmptySelection)?;
        self.tracker.cancel();
        Ok(rect)
    }

    fn clear_selection(&mut self) {
        self.tracker.cancel();
        self.selection = None;
        self.histogram = None;
    }

    fn refresh_histogram(&mut self) {
        let (w, h) = self.surface.dimensions();
        self.histogram = self
            .selection
            .and_then(|sel| sel.clamp_to(w, h))
            .map(|rect| HistogramSet::from_region(&self.surface.read_region(rect)));
    }

    /// Redraw the surface from the base image, then replay deletions.
    fn redraw(&mut self) {
        let (w, h) = self.surface.dimensions();
        self.surface = RasterSurface::scaled_from(&self.base, w, h, self.interpolation.to_filter());
        self.restore_log.replay(&mut self.surface);
    }

    /// Make the current surface the image later redraws start from.
    fn commit(&mut self) {
        self.base = self.surface.as_image().clone();
    }

    // ========================================================================
    // RENDERING
    // ========================================================================

    /// The surface with the selection outline drawn over it.
    pub fn render_preview(&self) -> RgbaImage {
        match self.selection {
            Some(sel) => self.surface.with_outline(sel, OUTLINE_COLOR, OUTLINE_WIDTH),
            None => self.surface.as_image().clone(),
        }
    }

    /// Bar chart of the active selection's histogram; blank without one.
    pub fn render_histogram(&self, width: u32, height: u32) -> RgbaImage {
        match &self.histogram {
            Some(hist) => hist.render(width, height),
            None => RgbaImage::new(width, height),
        }
    }
}
