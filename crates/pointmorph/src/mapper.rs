//! Saturation-sorted point correspondence.
//!
//! Every image in a gallery contributes one coordinate buffer. Slot `t` of the
//! buffer holds the pixel location of the `t`-th least saturated pixel, so two
//! buffers taken from different images pair up pixels of matching saturation
//! rank. Ties keep their original flat-index order which keeps the output
//! reproducible for identical input.

use image::RgbaImage;

/// Colour and flat index of a single pixel, used while sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSample {
    pub color: [u8; 3],
    pub index: u32,
}

impl PixelSample {
    pub fn saturation(&self) -> f32 {
        saturation(self.color)
    }
}

/// Interleaved `(x, y)` pixel coordinates, one pair per point slot.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateBuffer {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl CoordinateBuffer {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of point slots (`width * height`).
    pub fn len(&self) -> usize {
        self.data.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw interleaved floats, ready for upload as a vertex buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn slot(&self, slot: usize) -> Option<(f32, f32)> {
        let x = *self.data.get(slot * 2)?;
        let y = *self.data.get(slot * 2 + 1)?;
        Some((x, y))
    }

    pub fn pairs(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.data.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }
}

/// Saturation component of the HSL decomposition of an 8-bit RGB triple.
pub fn saturation(rgb: [u8; 3]) -> f32 {
    let [r, g, b] = rgb.map(|channel| f32::from(channel) / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max == min {
        return 0.0;
    }

    let delta = max - min;
    let lightness = (max + min) * 0.5;
    if lightness <= 0.5 {
        delta / (max + min)
    } else {
        delta / (2.0 - max - min)
    }
}

/// Stable ascending order of `keys`, returned as original indices.
pub fn correspondence_order(keys: &[f32]) -> Vec<u32> {
    let mut order: Vec<u32> = (0..keys.len() as u32).collect();
    // `sort_by` is stable, equal keys keep their index order.
    order.sort_by(|&a, &b| keys[a as usize].total_cmp(&keys[b as usize]));
    order
}

/// Builds the coordinate buffer for a decoded image.
///
/// Slot `t` receives `(i mod W, i div W)` for the pixel `i` it was sorted
/// from. On the square grids a [`Gallery`](crate::Gallery) holds this is the
/// same as `i div H`; rectangular input is accepted and stays row-major, so
/// every coordinate lands on a real pixel.
pub fn map_pixels(image: &RgbaImage) -> CoordinateBuffer {
    let (width, height) = image.dimensions();
    let samples: Vec<PixelSample> = image
        .pixels()
        .enumerate()
        .map(|(index, pixel)| PixelSample {
            color: [pixel[0], pixel[1], pixel[2]],
            index: index as u32,
        })
        .collect();
    let keys: Vec<f32> = samples.iter().map(PixelSample::saturation).collect();

    let mut data = Vec::with_capacity(samples.len() * 2);
    for slot in correspondence_order(&keys) {
        let sample = samples[slot as usize];
        data.push((sample.index % width) as f32);
        data.push((sample.index / width) as f32);
    }

    CoordinateBuffer {
        width,
        height,
        data,
    }
}

/// Fixed slot layout shared by every image: slot `k` sits at
/// `(k mod width, k div width)`.
pub fn position_grid(width: u32, height: u32) -> Vec<[f32; 2]> {
    let mut grid = Vec::with_capacity(width as usize * height as usize);
    for row in 0..height {
        for column in 0..width {
            grid.push([column as f32, row as f32]);
        }
    }
    grid
}
