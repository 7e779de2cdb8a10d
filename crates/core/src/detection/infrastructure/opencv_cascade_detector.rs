use std::path::{Path, PathBuf};

use opencv::core::{Rect, Size, Vector};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use thiserror::Error;

use crate::detection::domain::detection_params::DetectionParams;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::gray_image::GrayImage;
use crate::shared::mat_conversion::gray_to_mat;
use crate::shared::region::Region;

#[derive(Error, Debug)]
pub enum CascadeLoadError {
    #[error("cascade file not found: {0}")]
    NotFound(PathBuf),
    #[error("no usable cascade in {0}")]
    Empty(PathBuf),
    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
}

/// Haar cascade face detector backed by OpenCV's `CascadeClassifier`.
///
/// Each call runs `detectMultiScale` over the whole grayscale frame with
/// the configured scale step, neighbour count and size bounds.
pub struct OpenCvCascadeDetector {
    classifier: CascadeClassifier,
    params: DetectionParams,
}

impl OpenCvCascadeDetector {
    pub fn load(path: &Path, params: DetectionParams) -> Result<Self, CascadeLoadError> {
        if !path.is_file() {
            return Err(CascadeLoadError::NotFound(path.to_path_buf()));
        }
        // OpenCV reports a bad file as an empty classifier, not an error.
        let classifier = CascadeClassifier::new(&path.to_string_lossy())?;
        if classifier.empty()? {
            return Err(CascadeLoadError::Empty(path.to_path_buf()));
        }
        log::info!(
            "Loaded cascade {} (scale {}, min neighbors {})",
            path.display(),
            params.scale_factor(),
            params.min_neighbors()
        );
        Ok(Self { classifier, params })
    }

    pub fn params(&self) -> &DetectionParams {
        &self.params
    }
}

fn cv_size((width, height): (u32, u32)) -> Size {
    Size::new(width as i32, height as i32)
}

impl FaceDetector for OpenCvCascadeDetector {
    fn detect(&mut self, image: &GrayImage) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        let mat = gray_to_mat(image)?;
        let mut faces = Vector::<Rect>::new();
        // A zero max size means unbounded to OpenCV.
        let max_size = self.params.max_size().map(cv_size).unwrap_or_default();
        self.classifier.detect_multi_scale(
            &mat,
            &mut faces,
            self.params.scale_factor(),
            i32::try_from(self.params.min_neighbors()).unwrap_or(i32::MAX),
            0,
            cv_size(self.params.min_size()),
            max_size,
        )?;
        let regions: Vec<Region> = faces
            .iter()
            .map(|r| Region::new(r.x, r.y, r.width, r.height))
            .collect();
        log::debug!(
            "Detected {} face(s) in {}x{}",
            regions.len(),
            image.width(),
            image.height()
        );
        Ok(regions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// One-stage, one-stump cascade over a 20x20 window. The single Haar
    /// feature responds to a dark band above a bright band; the stump votes
    /// -1 below a normalised response of 0.5 and +1 at or above it.
    const EDGE_CASCADE_XML: &str = r#"<?xml version="1.0"?>
<opencv_storage>
<cascade type_id="opencv-cascade-classifier"><stageType>BOOST</stageType>
  <featureType>HAAR</featureType>
  <height>20</height>
  <width>20</width>
  <stageParams>
    <maxWeakCount>1</maxWeakCount></stageParams>
  <featureParams>
    <maxCatCount>0</maxCatCount>
    <featSize>1</featSize></featureParams>
  <stageNum>1</stageNum>
  <stages>
    <_>
      <maxWeakCount>1</maxWeakCount>
      <stageThreshold>STAGE_THRESHOLD</stageThreshold>
      <weakClassifiers>
        <_>
          <internalNodes>
            0 -1 0 5.0000000000000000e-01</internalNodes>
          <leafValues>
            -1. 1.</leafValues></_></weakClassifiers></_></stages>
  <features>
    <_>
      <rects>
        <_>
          2 2 16 8 -1.</_>
        <_>
          2 10 16 8 1.</_></rects></_></features></cascade>
</opencv_storage>
"#;

    fn write_cascade(dir: &TempDir, stage_threshold: &str) -> PathBuf {
        let path = dir.path().join("edge_cascade.xml");
        fs::write(
            &path,
            EDGE_CASCADE_XML.replace("STAGE_THRESHOLD", stage_threshold),
        )
        .unwrap();
        path
    }

    /// Dark band over a bright band at (40, 40)..(80, 80) on mid-grey.
    fn edge_pattern() -> GrayImage {
        let mut data = vec![128u8; 120 * 120];
        for y in 40..80 {
            let value = if y < 60 { 30 } else { 220 };
            data[y * 120 + 40..y * 120 + 80].fill(value);
        }
        GrayImage::from_raw(120, 120, data).unwrap()
    }

    #[test]
    fn test_finds_edge_pattern() {
        let dir = TempDir::new().unwrap();
        let path = write_cascade(&dir, "0.");
        let params = DetectionParams::new(1.25, 2).unwrap();
        let mut detector = OpenCvCascadeDetector::load(&path, params).unwrap();

        let faces = detector.detect(&edge_pattern()).unwrap();

        assert!(!faces.is_empty());
        let pattern = Region::new(40, 40, 40, 40);
        assert!(faces.iter().all(|r| r.intersection(&pattern).is_some()));
    }

    #[test]
    fn test_uniform_frame_has_no_faces() {
        let dir = TempDir::new().unwrap();
        let path = write_cascade(&dir, "0.");
        let mut detector = OpenCvCascadeDetector::load(&path, DetectionParams::default()).unwrap();
        let faces = detector.detect(&GrayImage::filled(120, 120, 90)).unwrap();
        assert!(faces.is_empty());
    }

    #[test]
    fn test_stage_score_just_below_stored_threshold_still_passes() {
        // A +1 vote is 1.0, which is under 1.000005 as written but not
        // under the stored threshold, which is 1e-5 lower.
        let dir = TempDir::new().unwrap();
        let path = write_cascade(&dir, "1.000005");
        let params = DetectionParams::new(1.25, 0).unwrap();
        let mut detector = OpenCvCascadeDetector::load(&path, params).unwrap();

        let faces = detector.detect(&edge_pattern()).unwrap();

        assert!(!faces.is_empty());
    }

    #[test]
    fn test_stage_threshold_above_best_score_rejects_everything() {
        let dir = TempDir::new().unwrap();
        let path = write_cascade(&dir, "1.001");
        let params = DetectionParams::new(1.25, 0).unwrap();
        let mut detector = OpenCvCascadeDetector::load(&path, params).unwrap();

        assert!(detector.detect(&edge_pattern()).unwrap().is_empty());
    }

    #[test]
    fn test_max_size_bounds_detections() {
        let dir = TempDir::new().unwrap();
        let path = write_cascade(&dir, "0.");
        let params = DetectionParams::new(1.25, 0)
            .unwrap()
            .with_max_size((30, 30))
            .unwrap();
        let mut detector = OpenCvCascadeDetector::load(&path, params).unwrap();

        let faces = detector.detect(&edge_pattern()).unwrap();

        assert!(faces.iter().all(|r| r.width <= 30 && r.height <= 30));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let result = OpenCvCascadeDetector::load(
            &dir.path().join("nope.xml"),
            DetectionParams::default(),
        );
        assert!(matches!(result, Err(CascadeLoadError::NotFound(_))));
    }

    #[test]
    fn test_non_cascade_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("junk.xml");
        fs::write(&path, "<?xml version=\"1.0\"?>\n<opencv_storage></opencv_storage>\n").unwrap();
        let result = OpenCvCascadeDetector::load(&path, DetectionParams::default());
        assert!(matches!(result, Err(CascadeLoadError::Empty(_))));
    }
}
