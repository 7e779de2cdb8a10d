use crate::shared::gray_image::GrayImage;

/// Outcome of classifying one face crop.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    /// `None` when no known identity is within the recognizer's threshold.
    pub label: Option<i32>,
    /// Distance to the closest match; lower is better.
    pub distance: f64,
}

impl Prediction {
    pub fn unknown() -> Self {
        Self {
            label: None,
            distance: f64::MAX,
        }
    }

    /// Overlay caption for the face box.
    pub fn caption(&self) -> String {
        match self.label {
            Some(id) => format!("ID: {id}"),
            None => "ID: unknown".to_string(),
        }
    }
}

/// Domain interface for identifying a cropped grayscale face.
pub trait FaceRecognizer: Send {
    fn predict(&self, face: &GrayImage) -> Result<Prediction, Box<dyn std::error::Error>>;

    /// Smallest crop, `(width, height)`, the model can describe. Smaller
    /// faces are reported as unknown without calling [`predict`](Self::predict).
    fn min_face_size(&self) -> (u32, u32) {
        (1, 1)
    }
}

/// Runs `recognizer` on `face`, or returns [`Prediction::unknown`] when the
/// crop is below the recognizer's minimum size.
pub fn identify(
    recognizer: &dyn FaceRecognizer,
    face: &GrayImage,
) -> Result<Prediction, Box<dyn std::error::Error>> {
    let (min_w, min_h) = recognizer.min_face_size();
    if face.width() < min_w || face.height() < min_h {
        log::debug!(
            "Face {}x{} is below the model minimum {min_w}x{min_h}",
            face.width(),
            face.height()
        );
        return Ok(Prediction::unknown());
    }
    recognizer.predict(face)
}
