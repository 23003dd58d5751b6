use crate::foundation::error::WeaselResult;
use crate::frame::model::Frame;

/// Consumer of finished output frames.
///
/// Ordering contract: `push_frame` is called in increasing sequence-number order, bracketed by one
/// `begin` and, after a complete run, one `end`.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self) -> WeaselResult<()>;
    /// Persist one output frame.
    fn push_frame(&mut self, frame: &Frame) -> WeaselResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> WeaselResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    /// Frames in output order.
    pub(crate) frames: Vec<Frame>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Whether `end` was called.
    pub fn ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self) -> WeaselResult<()> {
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, frame: &Frame) -> WeaselResult<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> WeaselResult<()> {
        self.ended = true;
        Ok(())
    }
}
