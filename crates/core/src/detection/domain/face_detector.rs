use crate::shared::gray_image::GrayImage;
use crate::shared::region::Region;

/// Domain interface for face detection.
///
/// Implementations may keep scratch buffers between frames,
/// hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(&mut self, image: &GrayImage) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}
