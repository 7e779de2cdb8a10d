use crate::shared::frame::Frame;

/// On-screen output for annotated frames plus keyboard polling.
pub trait FrameDisplay: Send {
    fn show(&mut self, title: &str, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Waits up to `delay_ms` for a key press. `None` when nothing was pressed.
    fn wait_key(&mut self, delay_ms: i32) -> Result<Option<char>, Box<dyn std::error::Error>>;

    /// Tears down every window this display opened. Safe to call more than once.
    fn close(&mut self);
}
