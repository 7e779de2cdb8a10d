pub mod image_file_source;
#[cfg(feature = "opencv")]
pub mod opencv_camera;
