use crate::foundation::core::{Extent, FrameIndex};
use crate::foundation::error::{WeaselError, WeaselResult};

/// One greyscale frame with intensities stored as `f32`, row-major.
///
/// Decoded frames use the nominal range `[0, 1]`; intermediate results may leave it (background
/// subtraction goes negative, amplification overshoots). Storage is owned by whichever buffer slot
/// currently holds the frame, and moves between pipeline stages by value.
///
/// A default frame is *unallocated*: it has no pixels and adopts the extent of the first operator
/// that writes into it. From then on its extent is fixed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    /// Sequence number of the source frame.
    pub index: FrameIndex,
    /// Acquisition time in seconds (0.0 when the codec has no timing information).
    pub time: f64,
    /// Set on the final frame of a run.
    pub is_last: bool,
    extent: Extent,
    data: Vec<f32>,
}

impl Frame {
    /// Build a frame from row-major pixel data.
    pub fn new(index: FrameIndex, extent: Extent, data: Vec<f32>) -> WeaselResult<Self> {
        if data.len() != extent.pixel_count() {
            return Err(WeaselError::validation(format!(
                "frame {} expects {} pixels for {}x{}, got {}",
                index.0,
                extent.pixel_count(),
                extent.width,
                extent.height,
                data.len()
            )));
        }
        Ok(Self {
            index,
            time: 0.0,
            is_last: false,
            extent,
            data,
        })
    }

    /// Build a frame where every pixel holds `value`.
    pub fn filled(index: FrameIndex, extent: Extent, value: f32) -> Self {
        Self {
            index,
            time: 0.0,
            is_last: false,
            extent,
            data: vec![value; extent.pixel_count()],
        }
    }

    /// Return `true` once pixel storage exists.
    pub fn is_allocated(&self) -> bool {
        !self.data.is_empty()
    }

    /// Frame dimensions (zero while unallocated).
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.extent.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.extent.height
    }

    /// Borrow the pixels, row-major.
    pub fn pixels(&self) -> &[f32] {
        &self.data
    }

    /// Mutably borrow the pixels, row-major.
    pub fn pixels_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Pixel at column `x`, row `y`.
    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.extent.width as usize + x]
    }

    /// Borrow row `y`.
    pub fn row(&self, y: usize) -> &[f32] {
        let w = self.extent.width as usize;
        &self.data[y * w..(y + 1) * w]
    }

    /// Allocate storage for `extent` on first use; afterwards require the extent to match.
    pub fn ensure_extent(&mut self, extent: Extent) -> WeaselResult<()> {
        if !self.is_allocated() {
            self.extent = extent;
            self.data = vec![0.0; extent.pixel_count()];
            return Ok(());
        }
        if self.extent != extent {
            return Err(WeaselError::execution(format!(
                "frame buffer is {}x{} but the operation produces {}x{}",
                self.extent.width, self.extent.height, extent.width, extent.height
            )));
        }
        Ok(())
    }

    /// Replace the pixel contents with `data`, keeping the allocation when the extent matches.
    ///
    /// Used by decoders; unlike [`Frame::ensure_extent`] a size change is reported as a decode error.
    pub fn store(&mut self, index: FrameIndex, extent: Extent, data: &[f32]) -> WeaselResult<()> {
        if data.len() != extent.pixel_count() {
            return Err(WeaselError::decode(format!(
                "frame {} decoded to {} pixels, expected {}",
                index.0,
                data.len(),
                extent.pixel_count()
            )));
        }
        if self.is_allocated() && self.extent != extent {
            return Err(WeaselError::decode(format!(
                "frame {} is {}x{}, previous frames were {}x{}",
                index.0, extent.width, extent.height, self.extent.width, self.extent.height
            )));
        }
        self.extent = extent;
        self.data.clear();
        self.data.extend_from_slice(data);
        self.index = index;
        Ok(())
    }

    /// Copy sequence number and timestamp from `other`.
    pub fn copy_metadata_from(&mut self, other: &Frame) {
        self.index = other.index;
        self.time = other.time;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/model.rs"]
mod tests;
