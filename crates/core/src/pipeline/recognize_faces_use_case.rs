use std::time::Instant;

use crate::capture::domain::frame_source::FrameSource;
use crate::detection::domain::face_detector::FaceDetector;
use crate::display::domain::frame_display::FrameDisplay;
use crate::display::domain::overlay::{Annotation, BoxStyle, LabelStyle, Overlay};
use crate::recognition::domain::face_recognizer::{identify, FaceRecognizer};
use crate::shared::constants::{KEY_POLL_MS, LABEL_OFFSET_Y, QUIT_KEY, WINDOW_TITLE};
use crate::shared::gray_image::GrayImage;

use super::pipeline_logger::PipelineLogger;

/// Presentation and control settings for the capture loop.
#[derive(Clone, Debug)]
pub struct LoopConfig {
    pub title: String,
    pub quit_key: char,
    pub wait_ms: i32,
    pub box_style: BoxStyle,
    pub label_style: LabelStyle,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            title: WINDOW_TITLE.to_string(),
            quit_key: QUIT_KEY,
            wait_ms: KEY_POLL_MS,
            box_style: BoxStyle::default(),
            label_style: LabelStyle::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    /// The source returned no frame or failed to read one.
    SourceExhausted,
    QuitKey,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoopSummary {
    pub frames: usize,
    pub faces: usize,
    pub exit: ExitReason,
}

/// Releases the source and closes the display when dropped, including
/// while unwinding from a panic inside the loop.
struct Session<'a> {
    source: &'a mut dyn FrameSource,
    display: &'a mut dyn FrameDisplay,
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.source.release();
        self.display.close();
    }
}

/// Live recognition loop: read, detect, identify, annotate, show.
///
/// Each iteration converts the frame to grayscale, detects faces, crops
/// and classifies every region, draws every box and `ID: <label>` caption
/// in one overlay pass, then shows the frame and polls the keyboard. Crops
/// below the recognizer's minimum size are captioned as unknown. The loop ends when the
/// source stops delivering frames or the quit key is pressed; errors from
/// detection, recognition or display propagate. Whatever the exit path,
/// the source is released and the display closed.
pub struct RecognizeFacesUseCase {
    source: Box<dyn FrameSource>,
    display: Box<dyn FrameDisplay>,
    overlay: Box<dyn Overlay>,
    detector: Box<dyn FaceDetector>,
    recognizer: Box<dyn FaceRecognizer>,
    logger: Box<dyn PipelineLogger>,
    config: LoopConfig,
}

impl RecognizeFacesUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Box<dyn FrameSource>,
        display: Box<dyn FrameDisplay>,
        overlay: Box<dyn Overlay>,
        detector: Box<dyn FaceDetector>,
        recognizer: Box<dyn FaceRecognizer>,
        logger: Box<dyn PipelineLogger>,
        config: LoopConfig,
    ) -> Self {
        Self {
            source,
            display,
            overlay,
            detector,
            recognizer,
            logger,
            config,
        }
    }

    pub fn execute(&mut self) -> Result<LoopSummary, Box<dyn std::error::Error>> {
        let config = &self.config;
        let session = Session {
            source: self.source.as_mut(),
            display: self.display.as_mut(),
        };
        let logger = self.logger.as_mut();
        logger.info(&format!("Press '{}' to quit", config.quit_key));

        let mut frames = 0;
        let mut faces = 0;

        let exit = loop {
            let t0 = Instant::now();
            let mut frame = match session.source.read() {
                Ok(Some(frame)) if !frame.is_empty() => frame,
                Ok(_) => {
                    log::warn!("No frame from source after {frames} frames; stopping");
                    break ExitReason::SourceExhausted;
                }
                Err(e) => {
                    log::warn!("Frame read failed after {frames} frames: {e}");
                    break ExitReason::SourceExhausted;
                }
            };
            logger.timing("capture", elapsed_ms(t0));

            let t0 = Instant::now();
            let gray = GrayImage::from_frame(&frame);
            let regions = self.detector.detect(&gray)?;
            logger.timing("detect", elapsed_ms(t0));
            logger.metric("faces", regions.len() as f64);

            let t0 = Instant::now();
            let mut annotations = Vec::with_capacity(regions.len());
            for region in &regions {
                let Some(face) = gray.crop(region) else {
                    log::debug!("Skipping {region:?}: outside the frame");
                    continue;
                };
                let prediction = identify(self.recognizer.as_ref(), &face)?;
                log::debug!(
                    "Frame {}: {region:?} -> {:?} (distance {:.2})",
                    frame.index(),
                    prediction.label,
                    prediction.distance
                );
                annotations.push(Annotation {
                    region: *region,
                    caption: prediction.caption(),
                    origin: (region.x, region.y - LABEL_OFFSET_Y),
                });
            }
            if !annotations.is_empty() {
                self.overlay.draw(
                    &mut frame,
                    &annotations,
                    &config.box_style,
                    &config.label_style,
                )?;
            }
            logger.timing("recognize", elapsed_ms(t0));

            let t0 = Instant::now();
            session.display.show(&config.title, &frame)?;
            let key = session.display.wait_key(config.wait_ms)?;
            logger.timing("display", elapsed_ms(t0));

            frames += 1;
            faces += regions.len();
            logger.frame_done(frames);

            if key == Some(config.quit_key) {
                break ExitReason::QuitKey;
            }
        };

        drop(session);
        logger.info(&format!(
            "Stopped ({exit:?}) after {frames} frames, {faces} faces"
        ));
        logger.summary();

        Ok(LoopSummary {
            frames,
            faces,
            exit,
        })
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
