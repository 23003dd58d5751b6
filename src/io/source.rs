use crate::foundation::core::FrameIndex;
use crate::foundation::error::{WeaselError, WeaselResult};
use crate::frame::model::Frame;

/// Producer of decoded input frames.
///
/// `read_frame` fills `into` in place so the pipeline can recycle buffers evicted from the window.
/// A source that knows the sequence ends at `index` sets `into.is_last`.
pub trait FrameSource: Send {
    /// Decode frame `index` into `into`.
    fn read_frame(&mut self, index: FrameIndex, into: &mut Frame) -> WeaselResult<()>;
}

/// Source serving frames held in memory, for tests and embedding.
///
/// The highest-numbered frame is reported as the end of the stream.
#[derive(Debug, Default)]
pub struct InMemorySource {
    frames: Vec<Frame>,
    reads: u64,
}

impl InMemorySource {
    /// Serve `frames`, looked up by their `index`.
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames, reads: 0 }
    }

    /// Number of successful `read_frame` calls.
    pub fn reads(&self) -> u64 {
        self.reads
    }
}

impl FrameSource for InMemorySource {
    fn read_frame(&mut self, index: FrameIndex, into: &mut Frame) -> WeaselResult<()> {
        let Some(src) = self.frames.iter().find(|f| f.index == index) else {
            return Err(WeaselError::decode(format!("no frame {} in memory", index.0)));
        };
        into.store(index, src.extent(), src.pixels())?;
        into.time = src.time;
        into.is_last = self.frames.iter().all(|f| f.index <= index);
        self.reads += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/io/source.rs"]
mod tests;
