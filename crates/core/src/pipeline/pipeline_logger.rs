use std::collections::HashMap;
use std::time::Instant;

/// Observer for capture-loop events.
///
/// Keeps the loop free of any particular output mechanism; the CLI logs
/// through the `log` facade while tests discard everything.
pub trait PipelineLogger: Send {
    /// Called once per processed frame with the running frame count.
    fn frame_done(&mut self, frames: usize);

    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. faces in the frame).
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// Emit an end-of-loop summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn frame_done(&mut self, _frames: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Logger backed by the `log` facade. Collects per-stage timings and
/// metrics and reports averages plus throughput when the loop ends.
///
/// A live camera has no frame total, so progress is a frame count logged
/// every `throttle_frames` frames at debug level.
pub struct LogPipelineLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    total_frames: usize,
    messages: Vec<String>,
}

impl LogPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            total_frames: 0,
            messages: Vec::new(),
        }
    }

    /// Returns the formatted summary string, or `None` if no data recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frames = self.total_frames;
        let mut lines = Vec::new();

        lines.push(format!(
            "Capture summary ({frames} frames, {:.1}s total):",
            elapsed_ms / 1000.0
        ));

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms  ({pct:4.1}%)"
            ));
        }

        let mut metric_names: Vec<_> = self.metrics.keys().collect();
        metric_names.sort();
        for name in metric_names {
            let values = &self.metrics[name];
            lines.push(format!(
                "  {name}: avg {:.1}  max {:.0}",
                mean(values),
                values.iter().copied().fold(0.0, f64::max)
            ));
        }

        if frames > 0 && elapsed_ms > 0.0 {
            let fps = frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new(100)
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn frame_done(&mut self, frames: usize) {
        self.total_frames = frames;
        if frames % self.throttle_frames == 0 {
            log::debug!("Processed {frames} frames");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.frame_done(1);
        logger.timing("detect", 5.0);
        logger.metric("faces", 3.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = LogPipelineLogger::new(10);
        logger.timing("detect", 20.0);
        logger.timing("detect", 30.0);
        logger.timing("recognize", 5.0);

        let detect = logger.timings_for("detect").unwrap();
        assert_eq!(detect, &[20.0, 30.0]);
        assert_eq!(logger.timings_for("recognize").unwrap().len(), 1);
        assert!(logger.timings_for("display").is_none());
    }

    #[test]
    fn test_metric_records_values() {
        let mut logger = LogPipelineLogger::new(10);
        logger.metric("faces", 3.0);
        logger.metric("faces", 4.0);

        let values = logger.metrics_for("faces").unwrap();
        assert_relative_eq!(mean(values), 3.5);
    }

    #[test]
    fn test_summary_lists_stages_and_metrics() {
        let mut logger = LogPipelineLogger::new(10);
        logger.frame_done(10);
        logger.timing("detect", 20.0);
        logger.timing("capture", 5.0);
        logger.metric("faces", 1.0);
        logger.metric("faces", 2.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Capture summary (10 frames"));
        assert!(summary.contains("detect"));
        assert!(summary.contains("capture"));
        assert!(summary.contains("faces: avg 1.5  max 2"));
        assert!(summary.contains("fps"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        let logger = LogPipelineLogger::new(10);
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_frame_done_tracks_count() {
        let mut logger = LogPipelineLogger::new(10);
        for i in 1..=25 {
            logger.frame_done(i);
        }
        assert_eq!(logger.total_frames, 25);
    }

    #[test]
    fn test_info_stores_messages() {
        let mut logger = LogPipelineLogger::new(10);
        logger.info("hello world");
        assert_eq!(logger.messages, vec!["hello world".to_string()]);
    }

    #[test]
    fn test_throttle_is_at_least_one() {
        assert_eq!(LogPipelineLogger::new(0).throttle_frames, 1);
        assert_eq!(LogPipelineLogger::default().throttle_frames, 100);
    }
}
