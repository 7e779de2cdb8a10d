use crate::shared::frame::Frame;

/// Produces frames for the capture loop, one per call.
///
/// `Ok(None)` means the source has nothing more to give (end of stream,
/// device lost or an empty grab). The loop treats that and an `Err` the
/// same way: it stops.
pub trait FrameSource: Send {
    fn read(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    /// Frees the underlying device. Safe to call more than once.
    fn release(&mut self);

    fn is_opened(&self) -> bool;
}
