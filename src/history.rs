// ============================================================================
// RESTORE LOG — deleted regions, replayed on every redraw from the base image
// ============================================================================

use crate::canvas::{PixelRegion, RasterSurface};

/// One deleted rectangle: the whited-out pixels that keep the deletion alive
/// across redraws, and the pixels that were there before.
#[derive(Clone, Debug)]
pub struct RestoreEntry {
    pub x: u32,
    pub y: u32,
    pub whiteout: PixelRegion,
    pub original: PixelRegion,
}

impl RestoreEntry {
    pub fn memory_size(&self) -> usize {
        self.whiteout.as_raw().len() + self.original.as_raw().len()
    }
}

/// Insertion-ordered record of deletions. Entries never expire or coalesce;
/// the log only empties when restored or when the surface geometry changes.
#[derive(Clone, Debug, Default)]
pub struct RestoreLog {
    entries: Vec<RestoreEntry>,
}

impl RestoreLog {
    pub fn push(&mut self, entry: RestoreEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn memory_size(&self) -> usize {
        self.entries.iter().map(RestoreEntry::memory_size).sum()
    }

    /// Re-apply every whiteout, oldest first.
    pub fn replay(&self, surface: &mut RasterSurface) {
        for entry in &self.entries {
            surface.write_region(&entry.whiteout, entry.x, entry.y);
        }
    }

    /// Put the pre-delete pixels back, newest first, and empty the log.
    /// Returns how many regions were restored.
    pub fn restore(&mut self, surface: &mut RasterSurface) -> usize {
        let count = self.entries.len();
        for entry in self.entries.drain(..).rev() {
            surface.write_region(&entry.original, entry.x, entry.y);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[test]
    fn replay_paints_whiteouts_in_order() {
        let mut surface = RasterSurface::new(8, 8);
        let mut log = RestoreLog::default();
        log.push(RestoreEntry {
            x: 0,
            y: 0,
            whiteout: PixelRegion::filled(4, 4, WHITE),
            original: PixelRegion::filled(4, 4, Rgba([0, 0, 0, 0])),
        });
        log.push(RestoreEntry {
            x: 2,
            y: 2,
            whiteout: PixelRegion::filled(2, 2, Rgba([1, 2, 3, 255])),
            original: PixelRegion::filled(2, 2, WHITE),
        });

        log.replay(&mut surface);
        assert_eq!(*surface.as_image().get_pixel(0, 0), WHITE);
        assert_eq!(*surface.as_image().get_pixel(3, 3), Rgba([1, 2, 3, 255]));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn restore_unwinds_overlapping_deletes_newest_first() {
        let mut surface = RasterSurface::new(4, 4);
        let mut log = RestoreLog::default();
        let black = Rgba([0, 0, 0, 255]);
        // First delete captured black pixels, second captured the first delete's white.
        log.push(RestoreEntry {
            x: 0,
            y: 0,
            whiteout: PixelRegion::filled(2, 2, WHITE),
            original: PixelRegion::filled(2, 2, black),
        });
        log.push(RestoreEntry {
            x: 0,
            y: 0,
            whiteout: PixelRegion::filled(2, 2, WHITE),
            original: PixelRegion::filled(2, 2, WHITE),
        });

        assert_eq!(log.restore(&mut surface), 2);
        assert_eq!(*surface.as_image().get_pixel(1, 1), black);
        assert!(log.is_empty());
    }
}
