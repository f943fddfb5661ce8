use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use crate::error::EditError;
use crate::ops::transform::{Interpolation, load_dimensions};
use crate::session::EditorSession;

/// File name offered for the exported image.
pub const DEFAULT_EXPORT_NAME: &str = "edited-image.png";

/// Loaded images are shown at 1 / this of their native size.
pub const DEFAULT_LOAD_SCALE: f32 = 2.5;

/// Options applied when an image is opened.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadOptions {
    /// Divisor applied to the native width and height.
    pub scale_divisor: f32,
    /// Filter used to draw the image onto the surface.
    pub interpolation: Interpolation,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { scale_divisor: DEFAULT_LOAD_SCALE, interpolation: Interpolation::default() }
    }
}

/// Decode an image file to RGBA.
///
/// The format is guessed from the file contents. Anything that is not a
/// recognised image yields `UnsupportedFileType`.
pub fn decode_image(path: &Path) -> Result<RgbaImage, EditError> {
    let bytes = std::fs::read(path)?;
    decode_bytes(&bytes, path)
}

fn decode_bytes(bytes: &[u8], origin: &Path) -> Result<RgbaImage, EditError> {
    let reader = image::io::Reader::new(Cursor::new(bytes)).with_guessed_format()?;
    if reader.format().is_none() {
        return Err(EditError::UnsupportedFileType(origin.to_path_buf()));
    }
    Ok(reader.decode()?.to_rgba8())
}

/// Start a session from a decoded image, with the surface at the load scale.
/// Fails with `SurfaceTooLarge` when the scaled surface would exceed the limits.
pub fn session_from_image(
    image: RgbaImage,
    options: &LoadOptions,
) -> Result<EditorSession, EditError> {
    let (w, h) = load_dimensions(image.width(), image.height(), options.scale_divisor)?;
    Ok(EditorSession::with_surface_size(image, w, h, options.interpolation))
}

/// Open an image file as a fresh editor session.
pub fn load_image(path: &Path, options: &LoadOptions) -> Result<EditorSession, EditError> {
    let image = decode_image(path)?;
    log_info!(
        "loaded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    session_from_image(image, options)
}

/// PNG-encode an image into `writer`.
pub fn write_png<W: Write>(image: &RgbaImage, writer: W) -> Result<(), EditError> {
    let encoder = PngEncoder::new(writer);
    encoder.write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)?;
    Ok(())
}

/// Write an image to `path` as PNG.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), EditError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_png(image, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Export the session's surface as PNG.
pub fn save_session(session: &EditorSession, path: &Path) -> Result<(), EditError> {
    save_png(session.surface().as_image(), path)?;
    log_info!("saved {}", path.display());
    Ok(())
}
