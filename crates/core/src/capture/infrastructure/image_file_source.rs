use std::path::Path;

use crate::capture::domain::frame_source::FrameSource;
use crate::shared::frame::Frame;

/// Serves a still image as a short stream of identical frames.
///
/// Decoded once with the `image` crate at construction; each `read` hands
/// out a copy until `repeat` frames have been produced, then `None`.
pub struct ImageFileSource {
    image: Option<image::RgbImage>,
    repeat: usize,
    served: usize,
}

impl ImageFileSource {
    pub fn open(path: &Path, repeat: usize) -> Result<Self, Box<dyn std::error::Error>> {
        let image = image::open(path)
            .map_err(|e| format!("Failed to open image {}: {e}", path.display()))?
            .to_rgb8();
        log::info!(
            "Reading {} ({}x{}), {repeat} frame(s)",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Self::from_image(image, repeat))
    }

    pub fn from_image(image: image::RgbImage, repeat: usize) -> Self {
        Self {
            image: Some(image),
            repeat,
            served: 0,
        }
    }
}

impl FrameSource for ImageFileSource {
    fn read(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let Some(image) = self.image.as_ref() else {
            return Ok(None);
        };
        if self.served >= self.repeat {
            return Ok(None);
        }
        let frame = Frame::try_new(
            image.as_raw().clone(),
            image.width(),
            image.height(),
            3,
            self.served,
        )?;
        self.served += 1;
        Ok(Some(frame))
    }

    fn release(&mut self) {
        self.image = None;
    }

    fn is_opened(&self) -> bool {
        self.image.is_some()
    }
}
