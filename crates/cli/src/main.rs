use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use facecam_core::capture::domain::frame_source::FrameSource;
use facecam_core::capture::infrastructure::image_file_source::ImageFileSource;
use facecam_core::capture::infrastructure::opencv_camera::OpenCvCamera;
use facecam_core::detection::domain::detection_params::DetectionParams;
use facecam_core::detection::domain::face_detector::FaceDetector;
use facecam_core::detection::infrastructure::opencv_cascade_detector::OpenCvCascadeDetector;
use facecam_core::display::infrastructure::highgui_window::HighGuiWindow;
use facecam_core::display::infrastructure::opencv_overlay::OpenCvOverlay;
use facecam_core::pipeline::pipeline_logger::LogPipelineLogger;
use facecam_core::pipeline::recognize_faces_use_case::{LoopConfig, RecognizeFacesUseCase};
use facecam_core::recognition::domain::face_recognizer::FaceRecognizer;
use facecam_core::recognition::infrastructure::opencv_lbph_recognizer::OpenCvLbphRecognizer;
use facecam_core::shared::constants::{
    CASCADE_FILE_NAME, CASCADE_URL, DEFAULT_CAMERA_INDEX, DEFAULT_MIN_NEIGHBORS,
    DEFAULT_MODEL_PATH, DEFAULT_SCALE_FACTOR, IMAGE_EXTENSIONS, KEY_POLL_MS, QUIT_KEY, WINDOW_TITLE,
};
use facecam_core::shared::model_resolver::{self, Resolution};

/// Live face recognition from a webcam with a trained LBPH model.
#[derive(Parser, Debug)]
#[command(name = "facecam")]
struct Cli {
    /// Trained LBPH model (OpenCV YAML).
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Haar cascade XML for face detection.
    #[arg(long, default_value = CASCADE_FILE_NAME)]
    cascade: PathBuf,

    /// Camera device index.
    #[arg(long, default_value_t = DEFAULT_CAMERA_INDEX)]
    camera: i32,

    /// Run on a still image instead of the camera.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Scale step between detection passes (> 1.0).
    #[arg(long, default_value_t = DEFAULT_SCALE_FACTOR)]
    scale_factor: f64,

    /// Overlapping detections needed to keep a face.
    #[arg(long, default_value_t = DEFAULT_MIN_NEIGHBORS)]
    min_neighbors: usize,

    /// Smallest face to look for, in pixels (square).
    #[arg(long)]
    min_size: Option<u32>,

    /// Override the model's distance threshold for a known identity.
    #[arg(long)]
    threshold: Option<f64>,

    /// Key that closes the window.
    #[arg(long, default_value_t = QUIT_KEY)]
    quit_key: char,

    /// Milliseconds to wait for a key press per frame.
    #[arg(long, default_value_t = KEY_POLL_MS)]
    wait_ms: i32,

    /// Window title.
    #[arg(long, default_value = WINDOW_TITLE)]
    title: String,

    /// Fetch the cascade from the OpenCV repository when it is missing locally.
    #[arg(long)]
    download_cascade: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let detector = build_detector(&cli)?;
    let recognizer = build_recognizer(&cli)?;
    let source = open_source(&cli)?;

    let config = LoopConfig {
        title: cli.title,
        quit_key: cli.quit_key,
        wait_ms: cli.wait_ms,
        ..LoopConfig::default()
    };
    let mut use_case = RecognizeFacesUseCase::new(
        source,
        Box::new(HighGuiWindow::new()),
        Box::new(OpenCvOverlay::new()),
        detector,
        recognizer,
        Box::new(LogPipelineLogger::default()),
        config,
    );
    let summary = use_case.execute()?;
    log::info!(
        "Done: {} frames, {} faces ({:?})",
        summary.frames,
        summary.faces,
        summary.exit
    );
    Ok(())
}

fn build_detector(cli: &Cli) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    let cache_dir = model_resolver::model_cache_dir().ok();
    let resolution = Resolution {
        explicit: &cli.cascade,
        cache_dir,
        url: cli.download_cascade.then_some(CASCADE_URL),
    };
    let cascade_path = model_resolver::resolve(&resolution, Some(Box::new(download_progress)))?;

    let mut params = DetectionParams::new(cli.scale_factor, cli.min_neighbors)?;
    if let Some(side) = cli.min_size {
        params = params.with_min_size((side, side))?;
    }
    Ok(Box::new(OpenCvCascadeDetector::load(&cascade_path, params)?))
}

fn build_recognizer(cli: &Cli) -> Result<Box<dyn FaceRecognizer>, Box<dyn std::error::Error>> {
    let mut recognizer = OpenCvLbphRecognizer::load(&cli.model)?;
    if let Some(threshold) = cli.threshold {
        recognizer.set_threshold(threshold)?;
    }
    Ok(Box::new(recognizer))
}

fn open_source(cli: &Cli) -> Result<Box<dyn FrameSource>, Box<dyn std::error::Error>> {
    match &cli.image {
        // A still image is shown until the quit key.
        Some(path) => Ok(Box::new(ImageFileSource::open(path, usize::MAX)?)),
        None => Ok(Box::new(OpenCvCamera::open(cli.camera)?)),
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.scale_factor <= 1.0 || !cli.scale_factor.is_finite() {
        return Err(format!(
            "Scale factor must be greater than 1.0, got {}",
            cli.scale_factor
        )
        .into());
    }
    if cli.wait_ms < 1 {
        return Err(format!("Wait must be at least 1 ms, got {}", cli.wait_ms).into());
    }
    if cli.camera < 0 {
        return Err(format!("Camera index must be non-negative, got {}", cli.camera).into());
    }
    if let Some(t) = cli.threshold {
        if t.is_nan() || t <= 0.0 {
            return Err(format!("Threshold must be positive, got {t}").into());
        }
    }
    if cli.min_size == Some(0) {
        return Err("Min size must be positive".into());
    }
    if cli.title.is_empty() {
        return Err("Window title must not be empty".into());
    }
    if !cli.model.exists() {
        return Err(format!("Model file not found: {}", cli.model.display()).into());
    }
    if let Some(image) = &cli.image {
        if !is_image(image) {
            return Err(format!("Not a supported image: {}", image.display()).into());
        }
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face cascade... {pct}%");
    } else {
        eprint!("\rDownloading face cascade... {downloaded} bytes");
    }
}
