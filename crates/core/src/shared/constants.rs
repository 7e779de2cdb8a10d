pub const DEFAULT_MODEL_PATH: &str = "TrainingImageLabel/trainner.yml";

pub const CASCADE_FILE_NAME: &str = "haarcascade_frontalface_default.xml";
pub const CASCADE_URL: &str =
    "https://raw.githubusercontent.com/opencv/opencv/4.x/data/haarcascades/haarcascade_frontalface_default.xml";

pub const DEFAULT_CAMERA_INDEX: i32 = 0;
pub const WINDOW_TITLE: &str = "Face Recognition";
pub const QUIT_KEY: char = 'q';
pub const KEY_POLL_MS: i32 = 10;

pub const DEFAULT_SCALE_FACTOR: f64 = 1.2;
pub const DEFAULT_MIN_NEIGHBORS: usize = 5;

/// Label text sits this many pixels above the face box.
pub const LABEL_OFFSET_Y: i32 = 10;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
