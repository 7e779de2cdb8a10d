use opencv::core::Mat;
use opencv::imgproc;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};

use crate::capture::domain::frame_source::FrameSource;
use crate::shared::frame::Frame;
use crate::shared::mat_conversion::mat_to_frame;

/// Live camera through OpenCV's `VideoCapture`. Frames come out as RGB.
pub struct OpenCvCamera {
    capture: Option<VideoCapture>,
    index: i32,
    frames_read: usize,
}

impl OpenCvCamera {
    /// Opens device `index`. A device that cannot be opened is an error.
    pub fn open(index: i32) -> Result<Self, Box<dyn std::error::Error>> {
        let capture = VideoCapture::new(index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(format!("Cannot open camera {index}").into());
        }
        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)?;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)?;
        log::info!("Opened camera {index} ({width}x{height})");
        Ok(Self {
            capture: Some(capture),
            index,
            frames_read: 0,
        })
    }
}

impl FrameSource for OpenCvCamera {
    fn read(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let Some(capture) = self.capture.as_mut() else {
            return Ok(None);
        };
        let mut bgr = Mat::default();
        if !capture.read(&mut bgr)? || bgr.empty() {
            return Ok(None);
        }
        let mut rgb = Mat::default();
        imgproc::cvt_color_def(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB)?;
        let frame = mat_to_frame(&rgb, self.frames_read)?;
        self.frames_read += 1;
        Ok(Some(frame))
    }

    fn release(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            match capture.release() {
                Ok(()) => log::debug!(
                    "Released camera {} after {} frames",
                    self.index,
                    self.frames_read
                ),
                Err(e) => log::warn!("Failed to release camera {}: {e}", self.index),
            }
        }
    }

    fn is_opened(&self) -> bool {
        self.capture
            .as_ref()
            .is_some_and(|c| c.is_opened().unwrap_or(false))
    }
}

impl Drop for OpenCvCamera {
    fn drop(&mut self) {
        self.release();
    }
}
