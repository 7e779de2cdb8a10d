use opencv::core::Mat;
use opencv::highgui;
use opencv::imgproc;
use opencv::prelude::*;

use crate::display::domain::frame_display::FrameDisplay;
use crate::shared::frame::Frame;
use crate::shared::mat_conversion::frame_to_mat;

/// `highgui` window output. Frames are converted to BGR just before `imshow`.
#[derive(Default)]
pub struct HighGuiWindow {
    open: bool,
}

impl HighGuiWindow {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameDisplay for HighGuiWindow {
    fn show(&mut self, title: &str, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let mat = frame_to_mat(frame)?;
        if frame.channels() == 3 {
            let mut bgr = Mat::default();
            imgproc::cvt_color_def(&mat, &mut bgr, imgproc::COLOR_RGB2BGR)?;
            highgui::imshow(title, &bgr)?;
        } else {
            highgui::imshow(title, &mat)?;
        }
        self.open = true;
        Ok(())
    }

    fn wait_key(&mut self, delay_ms: i32) -> Result<Option<char>, Box<dyn std::error::Error>> {
        let key = highgui::wait_key(delay_ms)?;
        if key < 0 {
            return Ok(None);
        }
        Ok(char::from_u32((key & 0xFF) as u32))
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Err(e) = highgui::destroy_all_windows() {
            log::warn!("Failed to close windows: {e}");
        }
    }
}
