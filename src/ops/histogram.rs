// ============================================================================
// HISTOGRAM — per-channel intensity counts and their bar chart
// ============================================================================

use image::{Rgba, RgbaImage};

use crate::canvas::PixelRegion;

pub const NUM_BINS: usize = 256;

/// Default chart size used by the front end.
pub const HISTOGRAM_WIDTH: u32 = 512;
pub const HISTOGRAM_HEIGHT: u32 = 200;

/// Red, green and blue intensity counts for one region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistogramSet {
    pub red: [u32; NUM_BINS],
    pub green: [u32; NUM_BINS],
    pub blue: [u32; NUM_BINS],
}

impl Default for HistogramSet {
    fn default() -> Self {
        Self { red: [0; NUM_BINS], green: [0; NUM_BINS], blue: [0; NUM_BINS] }
    }
}

impl HistogramSet {
    /// Count every pixel of the region. Alpha is not consulted.
    pub fn from_region(region: &PixelRegion) -> Self {
        let mut hist = Self::default();
        for px in region.pixels() {
            hist.red[px[0] as usize] += 1;
            hist.green[px[1] as usize] += 1;
            hist.blue[px[2] as usize] += 1;
        }
        hist
    }

    /// Number of pixels counted (identical for every channel).
    pub fn total(&self) -> u64 {
        self.red.iter().map(|&c| c as u64).sum()
    }

    /// Channels in draw order with their bar colours.
    pub fn channels(&self) -> [(&[u32; NUM_BINS], Rgba<u8>); 3] {
        [
            (&self.red, Rgba([255, 0, 0, 255])),
            (&self.green, Rgba([0, 128, 0, 255])),
            (&self.blue, Rgba([0, 0, 255, 255])),
        ]
    }

    /// Render the three channels as overlaid bar charts.
    ///
    /// Every channel is scaled against its own maximum, so the tallest bucket
    /// of each channel reaches the top of the chart.
    pub fn render(&self, width: u32, height: u32) -> RgbaImage {
        let mut chart = RgbaImage::new(width, height);
        if width == 0 || height == 0 {
            return chart;
        }
        let bar_w = width as f32 / NUM_BINS as f32;

        for (counts, color) in self.channels() {
            let max = counts.iter().copied().max().unwrap_or(0);
            if max == 0 {
                continue;
            }
            for (i, &count) in counts.iter().enumerate() {
                let bar_h = count as f32 / max as f32 * height as f32;
                fill_bar(&mut chart, i as f32 * bar_w, bar_w, bar_h, color);
            }
        }
        chart
    }
}

/// Fill a bottom-anchored bar. Pixels whose centre falls inside it are painted.
fn fill_bar(chart: &mut RgbaImage, left: f32, bar_w: f32, bar_h: f32, color: Rgba<u8>) {
    let (w, h) = chart.dimensions();
    let x0 = (left - 0.5).ceil().max(0.0) as u32;
    let x1 = ((left + bar_w - 0.5).ceil().max(0.0) as u32).min(w);
    let top = h as f32 - bar_h;
    let y0 = (top - 0.5).ceil().max(0.0) as u32;
    for y in y0..h {
        for x in x0..x1 {
            chart.put_pixel(x, y, color);
        }
    }
}
