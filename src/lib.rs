//! RasterEdit — rectangular-selection raster editing.
//!
//! An [`EditorSession`] owns a working surface, the active selection and the
//! log of deleted regions. User actions are [`Command`]s fed through
//! [`EditorSession::dispatch`]; [`io`] loads images into sessions and exports
//! them as PNG.

#[macro_use]
pub mod logger;
pub mod canvas;
pub mod cli;
pub mod command;
pub mod error;
pub mod history;
pub mod io;
pub mod ops;
pub mod session;

pub use canvas::{PixelRect, PixelRegion, RasterSurface, SelectionRect};
pub use command::{Command, parse_op};
pub use error::{EditError, Operation};
pub use ops::adjustments::Effect;
pub use ops::histogram::HistogramSet;
pub use ops::text::TextStyle;
pub use session::EditorSession;
