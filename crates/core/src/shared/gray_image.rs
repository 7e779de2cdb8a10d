use ndarray::{s, Array2, ArrayView2};

use crate::shared::frame::Frame;
use crate::shared::region::Region;

// ITU-R BT.601 luma weights in 14-bit fixed point.
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const SHIFT: u32 = 14;

/// Single-channel 8-bit image indexed `[row, col]`.
#[derive(Clone, Debug, PartialEq)]
pub struct GrayImage {
    pixels: Array2<u8>,
}

impl GrayImage {
    pub fn new(pixels: Array2<u8>) -> Self {
        Self { pixels }
    }

    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        Array2::from_shape_vec((height as usize, width as usize), data)
            .ok()
            .map(Self::new)
    }

    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self::new(Array2::from_elem((height as usize, width as usize), value))
    }

    /// Converts an RGB(A) or single-channel frame to luma.
    ///
    /// Rounding matches the grayscale images LBPH models are trained on.
    pub fn from_frame(frame: &Frame) -> Self {
        let width = frame.width() as usize;
        let height = frame.height() as usize;
        let channels = frame.channels() as usize;
        let data = frame.data();

        // Frame guarantees `data.len() == width * height * channels`.
        if channels == 1 {
            return Self::new(Array2::from_shape_fn((height, width), |(row, col)| {
                data[row * width + col]
            }));
        }

        let mut pixels = Array2::zeros((height, width));
        for ((row, col), px) in pixels.indexed_iter_mut() {
            let offset = (row * width + col) * channels;
            let r = data[offset] as u32;
            let g = data[offset + 1] as u32;
            let b = data[offset + 2] as u32;
            *px = ((r * R_WEIGHT + g * G_WEIGHT + b * B_WEIGHT + (1 << (SHIFT - 1))) >> SHIFT)
                as u8;
        }
        Self::new(pixels)
    }

    pub fn width(&self) -> u32 {
        self.pixels.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.pixels.nrows() as u32
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[[y, x]]
    }

    pub fn view(&self) -> ArrayView2<'_, u8> {
        self.pixels.view()
    }

    /// Copies the part of the image covered by `region`, clipped to bounds.
    pub fn crop(&self, region: &Region) -> Option<GrayImage> {
        let r = region.clamp_to(self.width(), self.height())?;
        let (x0, y0) = (r.x as usize, r.y as usize);
        let (x1, y1) = (r.right() as usize, r.bottom() as usize);
        Some(Self::new(self.pixels.slice(s![y0..y1, x0..x1]).to_owned()))
    }
}
