use anyhow::Result;

use crate::detect::result::DetectedSubject;
use crate::ingest::Frame;

/// Detection + recognition collaborator.
///
/// Implementations wrap the face/person models. They return boxes and identity labels only;
/// the engine never sees pixels or embeddings.
///
/// An `Err` means detection was unavailable for this frame (model failure, timeout). The
/// caller skips annotation for that frame and keeps running.
pub trait SubjectDetector: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Detect and label the people in a frame, in detector order.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectedSubject>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
