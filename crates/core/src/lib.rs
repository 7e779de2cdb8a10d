//! Webcam face recognition: Haar cascade detection, LBPH identification
//! and the capture loop that ties them to a camera and a window.
//!
//! Every adapter over OpenCV (camera, cascade, LBPH model, window) lives
//! behind the `opencv` feature. The domain types and the capture loop are
//! plain Rust and build without it.

pub mod capture {
    pub mod domain {
        pub mod frame_source;
    }
    pub mod infrastructure;
}

pub mod detection {
    pub mod domain {
        pub mod detection_params;
        pub mod face_detector;
    }
    #[cfg(feature = "opencv")]
    pub mod infrastructure;
}

pub mod display {
    pub mod domain {
        pub mod frame_display;
        pub mod overlay;
    }
    #[cfg(feature = "opencv")]
    pub mod infrastructure;
}

pub mod recognition {
    pub mod domain {
        pub mod face_recognizer;
    }
    #[cfg(feature = "opencv")]
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod pipeline_logger;
    pub mod recognize_faces_use_case;
}

pub mod shared;
