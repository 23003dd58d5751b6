use crate::foundation::core::Extent;
use crate::foundation::error::{WeaselError, WeaselResult};
use crate::frame::model::Frame;

/// Odd-length ring of decoded input frames centred on the frame being processed.
///
/// The ring never reorders storage: [`FrameWindow::advance`] overwrites the oldest slot and moves
/// both the replacement cursor and the centre forward by one, wrapping at the window length.
#[derive(Debug)]
pub struct FrameWindow {
    frames: Vec<Frame>,
    center: usize,
    replace: usize,
}

impl FrameWindow {
    /// Build a window from pre-filled frames in sequence order.
    pub fn new(frames: Vec<Frame>) -> WeaselResult<Self> {
        if frames.is_empty() || frames.len() % 2 == 0 {
            return Err(WeaselError::validation(format!(
                "frame window length must be odd, got {}",
                frames.len()
            )));
        }
        let extent = frames[0].extent();
        if let Some(bad) = frames.iter().find(|f| f.extent() != extent) {
            return Err(WeaselError::decode(format!(
                "frame {} is {}x{}, previous frames were {}x{}",
                bad.index.0,
                bad.width(),
                bad.height(),
                extent.width,
                extent.height
            )));
        }
        let center = (frames.len() - 1) / 2;
        Ok(Self {
            frames,
            center,
            replace: 0,
        })
    }

    /// Number of frames in the window.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`; a window holds at least one frame.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Ring position of the centre frame.
    pub fn center_index(&self) -> usize {
        self.center
    }

    /// The frame the program treats as `INPUT`.
    pub fn center(&self) -> &Frame {
        &self.frames[self.center]
    }

    /// All frames in ring order (not sequence order once the window has advanced).
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Shared extent of the frames in the window.
    pub fn extent(&self) -> Extent {
        self.frames[0].extent()
    }

    /// Swap `incoming` into the oldest slot and return the evicted frame for reuse.
    pub fn advance(&mut self, incoming: Frame) -> WeaselResult<Frame> {
        if incoming.extent() != self.extent() {
            return Err(WeaselError::decode(format!(
                "frame {} is {}x{}, previous frames were {}x{}",
                incoming.index.0,
                incoming.width(),
                incoming.height(),
                self.extent().width,
                self.extent().height
            )));
        }
        let evicted = std::mem::replace(&mut self.frames[self.replace], incoming);
        self.replace = (self.replace + 1) % self.frames.len();
        self.center = (self.center + 1) % self.frames.len();
        Ok(evicted)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/window.rs"]
mod tests;
