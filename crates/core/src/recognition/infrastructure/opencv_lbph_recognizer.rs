use std::path::{Path, PathBuf};

use opencv::core::{Mat, Ptr, Vector};
use opencv::face::{FaceRecognizerTrait, FaceRecognizerTraitConst, LBPHFaceRecognizer};
use opencv::prelude::*;
use thiserror::Error;

use crate::recognition::domain::face_recognizer::{FaceRecognizer, Prediction};
use crate::shared::gray_image::GrayImage;
use crate::shared::mat_conversion::gray_to_mat;

#[derive(Error, Debug)]
pub enum LbphError {
    #[error("model file not found: {0}")]
    NotFound(PathBuf),
    #[error("threshold must be positive, got {0}")]
    Threshold(f64),
    #[error("{images} images but {labels} labels")]
    LabelCount { images: usize, labels: usize },
    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
}

/// Settings for a fresh, untrained model. A model read from disk carries
/// its own.
#[derive(Clone, Debug, PartialEq)]
pub struct LbphParams {
    pub radius: i32,
    pub neighbors: i32,
    pub grid_x: i32,
    pub grid_y: i32,
    /// Matches at or beyond this distance are reported as unknown.
    pub threshold: f64,
}

impl Default for LbphParams {
    fn default() -> Self {
        Self {
            radius: 1,
            neighbors: 8,
            grid_x: 8,
            grid_y: 8,
            threshold: f64::MAX,
        }
    }
}

/// LBPH identity model backed by OpenCV's `face::LBPHFaceRecognizer`.
pub struct OpenCvLbphRecognizer {
    model: Ptr<LBPHFaceRecognizer>,
    min_face: (u32, u32),
}

impl OpenCvLbphRecognizer {
    pub fn new(params: &LbphParams) -> Result<Self, LbphError> {
        check_threshold(params.threshold)?;
        let model = LBPHFaceRecognizer::create(
            params.radius,
            params.neighbors,
            params.grid_x,
            params.grid_y,
            params.threshold,
        )?;
        Self::from_model(model)
    }

    /// Reads a model saved by OpenCV (`trainner.yml` and friends).
    pub fn load(path: &Path) -> Result<Self, LbphError> {
        if !path.is_file() {
            return Err(LbphError::NotFound(path.to_path_buf()));
        }
        let mut model = LBPHFaceRecognizer::create(1, 8, 8, 8, f64::MAX)?;
        // `Algorithm` also has a `read`, over a FileNode.
        FaceRecognizerTrait::read(&mut model, &path.to_string_lossy())?;
        let samples = model.get_histograms()?.len();
        log::info!(
            "Loaded LBPH model {} (radius {}, neighbors {}, grid {}x{}, {samples} samples)",
            path.display(),
            model.get_radius()?,
            model.get_neighbors()?,
            model.get_grid_x()?,
            model.get_grid_y()?
        );
        Self::from_model(model)
    }

    fn from_model(model: Ptr<LBPHFaceRecognizer>) -> Result<Self, LbphError> {
        // Every grid cell needs at least one LBP code.
        let border = 2 * model.get_radius()?.max(0);
        let min_face = (
            (border + model.get_grid_x()?.max(1)) as u32,
            (border + model.get_grid_y()?.max(1)) as u32,
        );
        Ok(Self { model, min_face })
    }

    /// Replaces any previous training with `faces`, labelled in order.
    pub fn train(&mut self, faces: &[GrayImage], labels: &[i32]) -> Result<(), LbphError> {
        if faces.len() != labels.len() {
            return Err(LbphError::LabelCount {
                images: faces.len(),
                labels: labels.len(),
            });
        }
        let images = faces
            .iter()
            .map(gray_to_mat)
            .collect::<opencv::Result<Vector<Mat>>>()?;
        self.model.train(&images, &Vector::<i32>::from_slice(labels))?;
        log::debug!("Trained LBPH model on {} faces", faces.len());
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), LbphError> {
        FaceRecognizerTraitConst::write(&self.model, &path.to_string_lossy())?;
        Ok(())
    }

    pub fn threshold(&self) -> Result<f64, LbphError> {
        Ok(self.model.get_threshold()?)
    }

    pub fn set_threshold(&mut self, threshold: f64) -> Result<(), LbphError> {
        check_threshold(threshold)?;
        self.model.set_threshold(threshold)?;
        Ok(())
    }
}

fn check_threshold(threshold: f64) -> Result<(), LbphError> {
    if threshold.is_nan() || threshold <= 0.0 {
        return Err(LbphError::Threshold(threshold));
    }
    Ok(())
}

impl FaceRecognizer for OpenCvLbphRecognizer {
    fn predict(&self, face: &GrayImage) -> Result<Prediction, Box<dyn std::error::Error>> {
        let mat = gray_to_mat(face)?;
        let mut label = -1;
        let mut distance = f64::MAX;
        self.model.predict(&mat, &mut label, &mut distance)?;
        // OpenCV reports "no match within threshold" as label -1.
        if label < 0 {
            return Ok(Prediction::unknown());
        }
        Ok(Prediction {
            label: Some(label),
            distance,
        })
    }

    fn min_face_size(&self) -> (u32, u32) {
        self.min_face
    }
}
