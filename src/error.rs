// ============================================================================
// EDIT ERRORS — every way a user action can be rejected
// ============================================================================

use std::fmt;
use std::path::PathBuf;

use image::ImageError;

/// Region operation that needs an active selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Crop,
    Effect,
    Delete,
}

impl Operation {
    /// The prompt shown to the user when the operation is attempted without
    /// a selection.
    pub fn selection_prompt(&self) -> &'static str {
        match self {
            Operation::Crop => "Select the area you want to crop.",
            Operation::Effect => "Select the area where you want to apply the effect.",
            Operation::Delete => "You have to select an area to delete.",
        }
    }
}

/// Error type for editor sessions, commands and file boundaries.
#[derive(Debug)]
pub enum EditError {
    /// Crop, effect or delete attempted with no active selection.
    MissingSelection(Operation),
    /// The selection does not cover a single pixel of the surface.
    EmptySelection,
    /// Both or neither of width/height were supplied to a scale.
    InvalidScaleInput,
    /// A scale, load or chart would need a surface past the size limits.
    SurfaceTooLarge { width: u64, height: u64 },
    /// Empty text, or a missing/zero font size or position.
    InvalidTextInput(String),
    /// The input file is not a decodable image.
    UnsupportedFileType(PathBuf),
    /// Text was requested but the session has no font to draw with.
    FontUnavailable,
    /// A command string could not be parsed.
    InvalidCommand(String),
    Image(ImageError),
    Io(std::io::Error),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::MissingSelection(op) => f.write_str(op.selection_prompt()),
            EditError::EmptySelection => f.write_str("The selected area is empty."),
            EditError::InvalidScaleInput => f.write_str("Select either the width or height."),
            EditError::SurfaceTooLarge { width, height } => {
                write!(f, "{}x{} is too large for the editing surface.", width, height)
            }
            EditError::InvalidTextInput(reason) => f.write_str(reason),
            EditError::UnsupportedFileType(path) => {
                write!(f, "Not an image file: {}", path.display())
            }
            EditError::FontUnavailable => f.write_str("No font is available to draw text."),
            EditError::InvalidCommand(cmd) => write!(f, "Invalid command: {}", cmd),
            EditError::Image(e) => write!(f, "Image error: {}", e),
            EditError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for EditError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EditError::Image(e) => Some(e),
            EditError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ImageError> for EditError {
    fn from(e: ImageError) -> Self {
        EditError::Image(e)
    }
}

impl From<std::io::Error> for EditError {
    fn from(e: std::io::Error) -> Self {
        EditError::Io(e)
    }
}

impl EditError {
    /// `true` for rejections caused by user input rather than the environment.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            EditError::MissingSelection(_)
                | EditError::EmptySelection
                | EditError::InvalidScaleInput
                | EditError::SurfaceTooLarge { .. }
                | EditError::InvalidTextInput(_)
                | EditError::InvalidCommand(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_selection_uses_operation_prompt() {
        let err = EditError::MissingSelection(Operation::Crop);
        assert_eq!(err.to_string(), "Select the area you want to crop.");
        let err = EditError::MissingSelection(Operation::Delete);
        assert_eq!(err.to_string(), "You have to select an area to delete.");
    }

    #[test]
    fn io_errors_are_not_user_input() {
        let err = EditError::from(std::io::Error::other("disk full"));
        assert!(!err.is_user_input());
        assert!(std::error::Error::source(&err).is_some());
        assert!(EditError::InvalidScaleInput.is_user_input());
        assert!(EditError::SurfaceTooLarge { width: 1, height: 1 }.is_user_input());
    }
}
