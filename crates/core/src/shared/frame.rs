use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
#[error("frame data is {actual} bytes, expected {expected} for {width}x{height}x{channels}")]
pub struct FrameSizeError {
    pub expected: usize,
    pub actual: usize,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

/// A single camera frame: contiguous RGB bytes in row-major order.
///
/// BGR/RGB conversion happens at the OpenCV boundary only; the domain
/// layer always sees RGB. The buffer always holds exactly
/// `width * height * channels` bytes.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    /// # Panics
    ///
    /// If `data` does not hold `width * height * channels` bytes. Use
    /// [`Frame::try_new`] for buffers from outside the crate.
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        match Self::try_new(data, width, height, channels, index) {
            Ok(frame) => frame,
            Err(e) => panic!("data length must equal width * height * channels: {e}"),
        }
    }

    pub fn try_new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        channels: u8,
        index: usize,
    ) -> Result<Self, FrameSizeError> {
        let expected = (width as usize) * (height as usize) * (channels as usize);
        if data.len() != expected {
            return Err(FrameSizeError {
                expected,
                actual: data.len(),
                width,
                height,
                channels,
            });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
            index,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
